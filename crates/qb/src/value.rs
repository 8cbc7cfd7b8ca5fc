//! Bound parameter values.
//!
//! A [`Value`] is opaque to the builder: it is stored in binding order and
//! handed to whatever executes the SQL. No type checking happens here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Json(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "'{v}'"),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Formats a binding list the way the log sinks print it: `[1, 'a', NULL]`.
pub(crate) fn display_bindings(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(feature = "postgres")]
mod postgres {
    use super::Value;
    use bytes::BytesMut;
    use std::error::Error;
    use tokio_postgres::types::{IsNull, ToSql, Type};

    type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

    /// Encode through `T`, rejecting column types `T` cannot represent.
    fn encode<T: ToSql>(value: &T, kind: &str, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        if !T::accepts(ty) {
            return Err(format!("cannot bind {kind} value as {ty}").into());
        }
        value.to_sql(ty, out)
    }

    // Integers narrow to the parameter width; out-of-range values are an error.
    impl ToSql for Value {
        fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
            match self {
                Value::Null => Ok(IsNull::Yes),
                Value::Bool(v) => encode(v, "bool", ty, out),
                Value::Int(v) => match *ty {
                    Type::INT2 => i16::try_from(*v)
                        .map_err(|_| format!("integer {v} out of range for {ty}"))?
                        .to_sql(ty, out),
                    Type::INT4 => i32::try_from(*v)
                        .map_err(|_| format!("integer {v} out of range for {ty}"))?
                        .to_sql(ty, out),
                    _ => encode(v, "integer", ty, out),
                },
                Value::Float(v) => match *ty {
                    Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                    _ => encode(v, "float", ty, out),
                },
                Value::Text(v) => encode(v, "text", ty, out),
                Value::Bytes(v) => encode(v, "bytes", ty, out),
                Value::Json(v) => encode(v, "json", ty, out),
                Value::Timestamp(v) => match *ty {
                    Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
                    _ => encode(v, "timestamp", ty, out),
                },
                Value::Uuid(v) => encode(v, "uuid", ty, out),
            }
        }

        fn accepts(ty: &Type) -> bool {
            matches!(
                *ty,
                Type::BOOL
                    | Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::TEXT
                    | Type::VARCHAR
                    | Type::BPCHAR
                    | Type::NAME
                    | Type::UNKNOWN
                    | Type::BYTEA
                    | Type::JSON
                    | Type::JSONB
                    | Type::TIMESTAMP
                    | Type::TIMESTAMPTZ
                    | Type::UUID
            )
        }

        tokio_postgres::types::to_sql_checked!();
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
    }

    #[test]
    fn display_quotes_text() {
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::from(3u8).to_string(), "3");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn display_binding_list() {
        let values = vec![Value::from(1), Value::from("a"), Value::Null];
        assert_eq!(display_bindings(&values), "[1, 'a', NULL]");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::from(1), Value::from("x")]).unwrap();
        assert_eq!(json, r#"[1,"x"]"#);
    }
}
