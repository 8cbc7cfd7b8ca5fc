//! Convenient imports for typical `qb` usage.
//!
//! ```ignore
//! use qb::prelude::*;
//! ```

pub use crate::{Adapter, Builder, Dialect, Expr, QbError, QbResult, Query, Value};
