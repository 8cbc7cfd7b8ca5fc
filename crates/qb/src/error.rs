//! Error types for qb

use thiserror::Error;

/// Result type alias for qb operations
pub type QbResult<T> = Result<T, QbError>;

/// Construction-time errors.
///
/// Query accumulation and rendering are total; only choosing a dialect or
/// loading a configuration can fail.
#[derive(Debug, Error)]
pub enum QbError {
    /// Dialect selector does not name a supported dialect
    #[error("Unknown dialect: '{0}'. Expected one of: generic, postgres, mysql, sqlite")]
    UnknownDialect(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QbError {
    /// Create an unknown dialect error
    pub fn unknown_dialect(selector: impl Into<String>) -> Self {
        Self::UnknownDialect(selector.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an unknown dialect error
    pub fn is_unknown_dialect(&self) -> bool {
        matches!(self, Self::UnknownDialect(_))
    }
}

impl From<toml::de::Error> for QbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dialect_display() {
        let err = QbError::unknown_dialect("oracle");
        assert_eq!(
            err.to_string(),
            "Unknown dialect: 'oracle'. Expected one of: generic, postgres, mysql, sqlite"
        );
        assert!(err.is_unknown_dialect());
    }
}
