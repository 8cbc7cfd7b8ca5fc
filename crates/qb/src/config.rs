//! Builder configuration.
//!
//! [`BuilderConfig`] is usually loaded from TOML and handed to
//! [`Builder::from_config`](crate::Builder::from_config).

use crate::dialect::Dialect;
use crate::error::QbResult;
use crate::sink::LogFlags;
use serde::{Deserialize, Serialize};

/// Builder configuration.
///
/// By default this selects the generic dialect with escaping and logging
/// disabled.
///
/// ```toml
/// dialect = "postgres"
/// escaping = true
///
/// [log]
/// query = true
/// bindings = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Dialect selector. Unknown names fail to deserialize.
    pub dialect: Dialect,
    /// Whether identifiers are quoted.
    pub escaping: bool,
    /// What the attached sink receives for each finalized query.
    pub log: LogFlags,
}

impl BuilderConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML.
    pub fn from_toml_str(raw: &str) -> QbResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_escaping(mut self, escaping: bool) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn with_log_flags(mut self, log: LogFlags) -> Self {
        self.log = log;
        self
    }
}
