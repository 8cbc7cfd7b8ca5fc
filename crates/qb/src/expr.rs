//! Condition expressions for WHERE/HAVING/ON clauses.
//!
//! An [`Expr`] is a deferred description of a condition. Nothing is escaped,
//! numbered or bound until [`Expr::build`] runs against the builder's adapter
//! and query, which happens when the expression is handed to a clause method.
//! Rendering walks the tree left to right and appends each value right after
//! reserving its placeholder, so `$n` and the Nth binding always line up no
//! matter in which order the expressions were constructed.

use crate::adapter::Adapter;
use crate::query::Query;
use crate::value::Value;

/// Expression node for building conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// AND group, rendered parenthesized: `(a AND b)`.
    And(Vec<Expr>),

    /// OR group: `a OR b`.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// Simple comparison: `column op placeholder`
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// NULL check: `column IS NULL` or `column IS NOT NULL`
    NullCheck { column: String, is_null: bool },

    /// IN list: `column IN (p,p)` or `column NOT IN (p,p)`
    InList {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// Template whose `?` markers become dialect placeholders; `??` is a literal `?`.
    /// Example: `Template { sql: "a = ? OR b = ?", values: [1, 2] }` -> `a = $1 OR b = $2`
    Template { sql: String, values: Vec<Value> },

    /// Raw SQL fragment without parameters.
    Raw(String),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    fn compare(column: impl Into<String>, op: &'static str, value: impl Into<Value>) -> Self {
        Expr::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, "=", value)
    }

    /// `column != value`
    pub fn not_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, "!=", value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, ">", value)
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, ">=", value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, "<", value)
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, "<=", value)
    }

    /// `column LIKE pattern`
    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: false,
        }
    }

    /// `column IN (values...)`. An empty list renders as `1=0`.
    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Expr::False;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: false,
        }
    }

    /// `column NOT IN (values...)`. An empty list renders as `1=1`.
    pub fn not_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Expr::True;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: true,
        }
    }

    /// Template expression with `?` markers.
    ///
    /// Every `?` reserves one placeholder and binds the next value, so the
    /// rendered fragment always carries exactly one binding per placeholder.
    /// A marker with no value left binds NULL; values beyond the last marker
    /// are not bound. Write `??` for a literal `?` (e.g. the JSONB operator).
    ///
    /// # Example
    /// ```ignore
    /// Expr::template("a = ? OR b = ?", [1, 2])
    /// ```
    pub fn template<V: Into<Value>>(
        sql: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Expr::Template {
            sql: sql.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// Check if this expression renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            Expr::Not(inner) => inner.is_empty(),
            Expr::Raw(sql) => sql.is_empty(),
            Expr::Template { sql, .. } => sql.is_empty(),
            _ => false,
        }
    }

    /// Render the expression, reserving placeholders on `adapter` and
    /// appending the matching values to `query`.
    pub fn build(&self, adapter: &mut dyn Adapter, query: &mut Query) -> String {
        match self {
            Expr::And(exprs) => {
                let parts: Vec<String> = exprs
                    .iter()
                    .filter(|e| !e.is_empty())
                    .map(|e| {
                        let sql = e.build(adapter, query);
                        // OR binds looser than AND
                        if matches!(e, Expr::Or(_)) && !sql.is_empty() {
                            format!("({})", sql)
                        } else {
                            sql
                        }
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    String::new()
                } else {
                    format!("({})", parts.join(" AND "))
                }
            }
            Expr::Or(exprs) => build_all(exprs, adapter, query).join(" OR "),
            Expr::Not(inner) => {
                let sql = inner.build(adapter, query);
                if sql.is_empty() {
                    String::new()
                } else {
                    format!("NOT ({})", sql)
                }
            }
            Expr::Compare { column, op, value } => {
                let column = adapter.escape(column);
                let placeholder = adapter.placeholder();
                query.add_value(value.clone());
                format!("{} {} {}", column, op, placeholder)
            }
            Expr::NullCheck { column, is_null } => {
                let column = adapter.escape(column);
                if *is_null {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} IS NOT NULL", column)
                }
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return if *negated { "1=1".to_string() } else { "1=0".to_string() };
                }
                let column = adapter.escape(column);
                let placeholders = adapter.placeholders(values.len());
                query.add_binding(values.iter().cloned());
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, op, placeholders.join(","))
            }
            Expr::Template { sql, values } => {
                let mut result = String::with_capacity(sql.len());
                let mut next = values.iter();
                let mut chars = sql.chars().peekable();
                while let Some(ch) = chars.next() {
                    if ch != '?' {
                        result.push(ch);
                        continue;
                    }
                    if chars.peek() == Some(&'?') {
                        chars.next();
                        result.push('?');
                        continue;
                    }
                    result.push_str(&adapter.placeholder());
                    query.add_value(next.next().cloned().unwrap_or(Value::Null));
                }
                result
            }
            Expr::Raw(sql) => sql.clone(),
            Expr::True => "1=1".to_string(),
            Expr::False => "1=0".to_string(),
        }
    }
}

fn build_all(exprs: &[Expr], adapter: &mut dyn Adapter, query: &mut Query) -> Vec<String> {
    exprs
        .iter()
        .filter(|e| !e.is_empty())
        .map(|e| e.build(adapter, query))
        .filter(|s| !s.is_empty())
        .collect()
}

impl From<&str> for Expr {
    fn from(sql: &str) -> Self {
        Expr::Raw(sql.to_string())
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        Expr::Raw(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{GenericAdapter, NumberedAdapter};

    fn render(expr: &Expr, adapter: &mut dyn Adapter) -> (String, Query) {
        let mut query = Query::new();
        let sql = expr.build(adapter, &mut query);
        (sql, query)
    }

    #[test]
    fn compare_numbers_and_binds() {
        let mut a = NumberedAdapter::new();
        let (sql, q) = render(&Expr::eq("id", 5), &mut a);
        assert_eq!(sql, "id = $1");
        assert_eq!(q.bindings(), &[Value::Int(5)]);
    }

    #[test]
    fn and_wraps_or_does_not() {
        let mut a = NumberedAdapter::new();
        let expr = Expr::or(vec![
            Expr::and(vec![Expr::eq("a", 1), Expr::gt("b", 2)]),
            Expr::lte("c", 3),
        ]);
        let (sql, q) = render(&expr, &mut a);
        assert_eq!(sql, "(a = $1 AND b > $2) OR c <= $3");
        assert_eq!(q.bindings(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn empty_and_renders_nothing() {
        let mut a = GenericAdapter::new();
        let (sql, q) = render(&Expr::and(vec![]), &mut a);
        assert_eq!(sql, "");
        assert!(q.bindings().is_empty());
        assert!(Expr::and(vec![Expr::or(vec![])]).is_empty());
    }

    #[test]
    fn in_list_escapes_key() {
        let mut a = GenericAdapter::new();
        a.set_escaping(true);
        let (sql, q) = render(&Expr::in_list("id", [10, 20, 30]), &mut a);
        assert_eq!(sql, r#""id" IN (?,?,?)"#);
        assert_eq!(q.binding_count(), 3);
        assert_eq!(a.placeholder_count(), 3);
    }

    #[test]
    fn empty_lists_collapse_to_constants() {
        let mut a = GenericAdapter::new();
        assert_eq!(render(&Expr::in_list("id", Vec::<i32>::new()), &mut a).0, "1=0");
        assert_eq!(render(&Expr::not_in("id", Vec::<i32>::new()), &mut a).0, "1=1");
    }

    #[test]
    fn template_replaces_markers() {
        let mut a = NumberedAdapter::new();
        a.placeholder();
        let (sql, q) = render(&Expr::template("a = ? OR b = ?", ["x", "y"]), &mut a);
        assert_eq!(sql, "a = $2 OR b = $3");
        assert_eq!(q.binding_count(), 2);
    }

    #[test]
    fn template_binds_one_value_per_marker() {
        let mut a = GenericAdapter::new();
        let (sql, q) = render(&Expr::template("a = ? AND b = ?", [1]), &mut a);
        assert_eq!(sql, "a = ? AND b = ?");
        assert_eq!(q.bindings(), &[Value::Int(1), Value::Null]);
        assert_eq!(a.placeholder_count(), 2);

        let mut a = NumberedAdapter::new();
        let (sql, q) = render(&Expr::template("a = ?", [1, 2, 3]), &mut a);
        assert_eq!(sql, "a = $1");
        assert_eq!(q.bindings(), &[Value::Int(1)]);
    }

    #[test]
    fn template_doubled_marker_is_literal() {
        let mut a = NumberedAdapter::new();
        let (sql, q) = render(&Expr::template("data ?? ? AND id = ?", ["k", "7"]), &mut a);
        assert_eq!(sql, "data ? $1 AND id = $2");
        assert_eq!(q.bindings(), &[Value::from("k"), Value::from("7")]);
    }

    #[test]
    fn and_wraps_nested_or() {
        let mut a = NumberedAdapter::new();
        let expr = Expr::and(vec![
            Expr::or(vec![Expr::eq("a", 1), Expr::eq("b", 2)]),
            Expr::eq("c", 3),
        ]);
        let (sql, q) = render(&expr, &mut a);
        assert_eq!(sql, "((a = $1 OR b = $2) AND c = $3)");
        assert_eq!(q.bindings(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);

        let (sql, _) = render(&Expr::and(vec![Expr::or(vec![]), Expr::eq("d", 4)]), &mut a);
        assert_eq!(sql, "(d = $4)");
    }

    #[test]
    fn not_and_null_checks() {
        let mut a = GenericAdapter::new();
        let (sql, _) = render(
            &Expr::not(Expr::and(vec![Expr::is_null("a"), Expr::is_not_null("b")])),
            &mut a,
        );
        assert_eq!(sql, "NOT ((a IS NULL AND b IS NOT NULL))");
    }
}
