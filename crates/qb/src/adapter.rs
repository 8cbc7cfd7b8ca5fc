//! Dialect-specific identifier escaping and placeholder generation.
//!
//! An [`Adapter`] carries two pieces of state:
//! - whether identifiers are escaped (a builder-lifetime setting), and
//! - how many placeholders the current query has reserved.
//!
//! The placeholder counter is per query. Whoever owns the adapter must call
//! [`Adapter::reset`] every time a new query begins; nothing does it
//! automatically. [`Builder`](crate::Builder) does this in
//! [`Builder::reset`](crate::Builder::reset).

use crate::dialect::Dialect;
use std::fmt;

/// Escaping and placeholder strategy for one SQL dialect.
pub trait Adapter: Send + fmt::Debug {
    /// The dialect this adapter renders for.
    fn dialect(&self) -> Dialect;

    /// Quote an identifier when escaping is enabled.
    ///
    /// For qualified names (`t.col`) only the segment after the last dot is
    /// quoted; the prefix and the dot are kept verbatim.
    fn escape(&self, identifier: &str) -> String;

    /// Apply [`Adapter::escape`] to every identifier, preserving order.
    fn escape_all(&self, identifiers: &[&str]) -> Vec<String> {
        identifiers.iter().map(|i| self.escape(i)).collect()
    }

    /// Reserve the next positional slot and return its token.
    fn placeholder(&mut self) -> String;

    /// Reserve `count` slots, one [`Adapter::placeholder`] call each.
    fn placeholders(&mut self, count: usize) -> Vec<String> {
        (0..count).map(|_| self.placeholder()).collect()
    }

    /// Number of placeholders reserved since the last reset.
    fn placeholder_count(&self) -> usize;

    fn set_escaping(&mut self, escaping: bool);

    fn escaping(&self) -> bool;

    /// Zero the placeholder counter. The escaping flag is left alone.
    fn reset(&mut self);
}

fn wrap(identifier: &str, quote: char) -> String {
    match identifier.rsplit_once('.') {
        Some((prefix, name)) => format!("{prefix}.{quote}{name}{quote}"),
        None => format!("{quote}{identifier}{quote}"),
    }
}

/// Static `?` placeholders with a configurable quote character.
///
/// Used for SQLite, MySQL and the generic dialect. The counter is still
/// tracked so every variant reports how many slots a query reserved.
/// Escaping starts disabled.
#[derive(Debug, Clone)]
pub struct GenericAdapter {
    dialect: Dialect,
    quote: char,
    escaping: bool,
    placeholder_count: usize,
}

impl GenericAdapter {
    /// Adapter for the generic dialect, quoting with `"`.
    pub fn new() -> Self {
        Self::with_quote(Dialect::Generic, '"')
    }

    pub fn with_quote(dialect: Dialect, quote: char) -> Self {
        Self {
            dialect,
            quote,
            escaping: false,
            placeholder_count: 0,
        }
    }

    pub fn quote(&self) -> char {
        self.quote
    }
}

impl Default for GenericAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for GenericAdapter {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn escape(&self, identifier: &str) -> String {
        if !self.escaping {
            return identifier.to_string();
        }
        wrap(identifier, self.quote)
    }

    fn placeholder(&mut self) -> String {
        self.placeholder_count += 1;
        "?".to_string()
    }

    fn placeholder_count(&self) -> usize {
        self.placeholder_count
    }

    fn set_escaping(&mut self, escaping: bool) {
        self.escaping = escaping;
    }

    fn escaping(&self) -> bool {
        self.escaping
    }

    fn reset(&mut self) {
        self.placeholder_count = 0;
    }
}

/// Numbered placeholders (`$1`, `$2`, ...) derived from the running count.
#[derive(Debug, Clone)]
pub struct NumberedAdapter {
    dialect: Dialect,
    quote: char,
    prefix: char,
    escaping: bool,
    placeholder_count: usize,
}

impl NumberedAdapter {
    /// Postgres-style adapter: `$n` placeholders, `"` quoting.
    pub fn new() -> Self {
        Self::with_quote(Dialect::Postgres, '"')
    }

    pub fn with_quote(dialect: Dialect, quote: char) -> Self {
        Self {
            dialect,
            quote,
            prefix: '$',
            escaping: false,
            placeholder_count: 0,
        }
    }

    /// Override the placeholder prefix (default `$`).
    pub fn prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }
}

impl Default for NumberedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for NumberedAdapter {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn escape(&self, identifier: &str) -> String {
        if !self.escaping {
            return identifier.to_string();
        }
        wrap(identifier, self.quote)
    }

    fn placeholder(&mut self) -> String {
        self.placeholder_count += 1;
        format!("{}{}", self.prefix, self.placeholder_count)
    }

    fn placeholder_count(&self) -> usize {
        self.placeholder_count
    }

    fn set_escaping(&mut self, escaping: bool) {
        self.escaping = escaping;
    }

    fn escaping(&self) -> bool {
        self.escaping
    }

    fn reset(&mut self) {
        self.placeholder_count = 0;
    }
}
