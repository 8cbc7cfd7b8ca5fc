//! Observers notified when a query is finalized.
//!
//! A [`Builder`](crate::Builder) has no logger of its own. Attach a
//! [`QuerySink`] and pick what it receives with [`LogFlags`]:
//!
//! ```rust,ignore
//! use qb::{Builder, CaptureSink, Dialect, LogFlags};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(CaptureSink::new());
//! let mut b = Builder::new(Dialect::Postgres)
//!     .with_sink(sink.clone())
//!     .with_log_flags(LogFlags::ALL);
//!
//! b.select(["id"]).from(["users"]);
//! let _query = b.query();
//! assert_eq!(sink.events()[0].sql.as_deref(), Some("SELECT id FROM users"));
//! ```

use crate::dialect::Dialect;
use crate::value::{Value, display_bindings};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::ops::BitOr;
use std::sync::{Arc, Mutex};

/// Which parts of a finalized query are reported to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFlags {
    /// Report the rendered SQL.
    pub query: bool,
    /// Report the binding list.
    pub bindings: bool,
}

impl LogFlags {
    pub const NONE: LogFlags = LogFlags {
        query: false,
        bindings: false,
    };
    pub const QUERY: LogFlags = LogFlags {
        query: true,
        bindings: false,
    };
    pub const BINDINGS: LogFlags = LogFlags {
        query: false,
        bindings: true,
    };
    pub const ALL: LogFlags = LogFlags {
        query: true,
        bindings: true,
    };

    pub fn is_none(&self) -> bool {
        !self.query && !self.bindings
    }
}

impl BitOr for LogFlags {
    type Output = LogFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        LogFlags {
            query: self.query || rhs.query,
            bindings: self.bindings || rhs.bindings,
        }
    }
}

/// What a sink sees for one finalized query.
///
/// Only the parts enabled by the builder's [`LogFlags`] are populated.
#[derive(Debug, Clone, Copy)]
pub struct QueryEvent<'a> {
    pub dialect: Dialect,
    pub sql: Option<&'a str>,
    pub bindings: Option<&'a [Value]>,
}

/// Observer invoked once per finalized query.
pub trait QuerySink: Send + Sync {
    fn on_query(&self, event: &QueryEvent<'_>);
}

impl<T: QuerySink + ?Sized> QuerySink for Arc<T> {
    fn on_query(&self, event: &QueryEvent<'_>) {
        (**self).on_query(event)
    }
}

/// An owned copy of a [`QueryEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub dialect: Dialect,
    pub sql: Option<String>,
    pub bindings: Option<Vec<Value>>,
}

impl From<&QueryEvent<'_>> for RecordedQuery {
    fn from(event: &QueryEvent<'_>) -> Self {
        Self {
            dialect: event.dialect,
            sql: event.sql.map(str::to_string),
            bindings: event.bindings.map(<[Value]>::to_vec),
        }
    }
}

/// A sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    events: Mutex<Vec<RecordedQuery>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    pub fn events(&self) -> Vec<RecordedQuery> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl QuerySink for CaptureSink {
    fn on_query(&self, event: &QueryEvent<'_>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RecordedQuery::from(event));
        }
    }
}

/// A sink that writes line-oriented output to any [`Write`].
///
/// Each event prints the SQL line (if enabled), the binding list line (if
/// enabled), then a blank line.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    out: Mutex<W>,
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_event(out: &mut W, event: &QueryEvent<'_>) -> std::io::Result<()> {
        if let Some(sql) = event.sql {
            writeln!(out, "{sql}")?;
        }
        if let Some(bindings) = event.bindings {
            writeln!(out, "{}", display_bindings(bindings))?;
        }
        writeln!(out)?;
        out.flush()
    }
}

impl<W: Write + Send> QuerySink for WriterSink<W> {
    fn on_query(&self, event: &QueryEvent<'_>) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // Output failures must not break query construction.
        let _ = Self::write_event(&mut out, event);
    }
}

/// Fans each event out to several sinks, in insertion order.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn QuerySink>>,
}

impl CompositeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: QuerySink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn add_arc(mut self, sink: Arc<dyn QuerySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl QuerySink for CompositeSink {
    fn on_query(&self, event: &QueryEvent<'_>) {
        for sink in &self.sinks {
            sink.on_query(event);
        }
    }
}

#[cfg(feature = "tracing")]
pub use self::tracing_sink::TracingSink;

#[cfg(feature = "tracing")]
mod tracing_sink {
    use super::{QueryEvent, QuerySink};
    use crate::value::display_bindings;
    use tracing::Level;

    /// A `tracing`-based sink that emits each finalized query.
    ///
    /// Enable via the crate feature: `qb = { features = ["tracing"] }`.
    #[derive(Debug, Clone)]
    pub struct TracingSink {
        /// Tracing event level to emit at.
        pub level: Level,
        /// Truncate long SQL strings (in bytes). `None` means no truncation.
        pub max_sql_length: Option<usize>,
    }

    impl Default for TracingSink {
        fn default() -> Self {
            Self {
                level: Level::DEBUG,
                max_sql_length: Some(200),
            }
        }
    }

    impl TracingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Override the tracing event level.
        pub fn level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Set maximum SQL length to display.
        pub fn max_sql_length(mut self, len: usize) -> Self {
            self.max_sql_length = Some(len);
            self
        }

        /// Disable SQL truncation.
        pub fn no_truncate(mut self) -> Self {
            self.max_sql_length = None;
            self
        }

        pub(crate) fn truncate_sql(&self, sql: &str) -> String {
            match self.max_sql_length {
                Some(max) if sql.len() > max => {
                    format!("{}...", super::truncate_sql_bytes(sql, max))
                }
                _ => sql.to_string(),
            }
        }
    }

    impl QuerySink for TracingSink {
        fn on_query(&self, event: &QueryEvent<'_>) {
            /// Dispatch a tracing event at a runtime-determined level.
            macro_rules! emit_at_level {
                ($level:expr, $($field:tt)*) => {
                    match $level {
                        Level::ERROR => tracing::error!($($field)*),
                        Level::WARN  => tracing::warn!($($field)*),
                        Level::INFO  => tracing::info!($($field)*),
                        Level::DEBUG => tracing::debug!($($field)*),
                        Level::TRACE => tracing::trace!($($field)*),
                    }
                };
            }

            let sql = event.sql.map(|s| self.truncate_sql(s)).unwrap_or_default();
            let bindings = event.bindings.map(display_bindings).unwrap_or_default();
            let param_count = event.bindings.map_or(0, |b| b.len());
            emit_at_level!(
                self.level,
                target: "qb.sql",
                dialect = %event.dialect,
                param_count,
                sql = %sql,
                bindings = %bindings,
            );
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
