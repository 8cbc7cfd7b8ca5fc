//! # qb
//!
//! A fluent SQL statement builder for several dialects.
//!
//! ## Features
//!
//! - **Ordered accumulation**: clauses render in call order, space-joined
//! - **Aligned bindings**: the Nth placeholder always matches the Nth bound value
//! - **Dialect adapters**: `?` or `$1, $2, ...` placeholders, per-dialect identifier quoting
//! - **Fail fast**: unknown dialect selectors are an error, never a silent fallback
//! - **Pluggable logging**: finalized queries go to an injected [`QuerySink`]
//!
//! ## Quick Example
//!
//! ```ignore
//! use qb::{Builder, Dialect, Expr};
//!
//! let mut b = Builder::new(Dialect::Postgres);
//!
//! b.update("users")
//!     .set([("status", "inactive")])
//!     .where_(Expr::eq("id", 42));
//!
//! let query = b.query();
//! assert_eq!(query.sql(), "UPDATE users SET status = $1 WHERE id = $2");
//! assert_eq!(query.bindings().len(), 2);
//! ```
//!
//! ## Core pieces
//!
//! [`Query`] and [`Adapter`] know nothing about each other. [`Builder`]
//! drives both and is the only place that resets them together.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod prelude;
pub mod query;
pub mod sink;
pub mod value;

pub use adapter::{Adapter, GenericAdapter, NumberedAdapter};
pub use builder::Builder;
pub use config::BuilderConfig;
pub use dialect::Dialect;
pub use error::{QbError, QbResult};
pub use expr::Expr;
pub use query::Query;
pub use sink::{
    CaptureSink, CompositeSink, LogFlags, QueryEvent, QuerySink, RecordedQuery, WriterSink,
};
pub use value::Value;

#[cfg(feature = "tracing")]
pub use sink::TracingSink;
