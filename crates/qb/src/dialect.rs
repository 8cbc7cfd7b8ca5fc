//! Supported SQL dialects.

use crate::adapter::{Adapter, GenericAdapter, NumberedAdapter};
use crate::error::{QbError, QbResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects.
///
/// Parsing a selector that names none of these fails; there is no silent
/// fallback to [`Dialect::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// `?` placeholders, `"` quoting.
    #[default]
    Generic,
    /// `$n` placeholders, `"` quoting.
    Postgres,
    /// `?` placeholders, `` ` `` quoting.
    MySql,
    /// `?` placeholders, `"` quoting.
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Generic,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
    ];

    /// Parse a dialect selector such as `"postgres"` or `"sqlite3"`.
    pub fn parse(selector: &str) -> QbResult<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "generic" | "default" => Ok(Dialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(QbError::unknown_dialect(selector)),
        }
    }

    /// Canonical selector for this dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Identifier quote character.
    pub fn escape_char(&self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Postgres | Dialect::Sqlite => '"',
        }
    }

    /// Whether placeholders carry their position (`$1`) rather than `?`.
    pub fn numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Build a fresh adapter for this dialect.
    pub fn adapter(&self) -> Box<dyn Adapter> {
        match self {
            Dialect::Postgres => Box::new(NumberedAdapter::with_quote(*self, self.escape_char())),
            Dialect::Generic | Dialect::MySql | Dialect::Sqlite => {
                Box::new(GenericAdapter::with_quote(*self, self.escape_char()))
            }
        }
    }
}

impl FromStr for Dialect {
    type Err = QbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selector = String::deserialize(deserializer)?;
        Dialect::parse(&selector).map_err(serde::de::Error::custom)
    }
}
