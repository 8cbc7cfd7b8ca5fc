//! Fluent clause builder.
//!
//! [`Builder`] owns one [`Query`] and one [`Adapter`]. Every clause method
//! escapes identifiers through the adapter, reserves placeholders from it, and
//! appends the fragment and its values to the query in the order the methods
//! are called. [`Builder::query`] hands out the finished query and starts a
//! fresh one.
//!
//! # Example
//!
//! ```ignore
//! use qb::{Builder, Dialect, Expr};
//!
//! let mut b = Builder::new(Dialect::Postgres);
//! b.set_escaping(true);
//!
//! b.select(["id", "name"])
//!     .from(["users u"])
//!     .where_(Expr::and(vec![Expr::eq("u.active", true), Expr::gt("u.age", 18)]))
//!     .order_by(["id DESC"])
//!     .limit(0, 10);
//!
//! let query = b.query();
//! assert_eq!(
//!     query.sql(),
//!     r#"SELECT id, name FROM "users" u WHERE (u."active" = $1 AND u."age" > $2) ORDER BY id DESC LIMIT 10 OFFSET 0"#
//! );
//! ```

use crate::adapter::Adapter;
use crate::config::BuilderConfig;
use crate::dialect::Dialect;
use crate::error::QbResult;
use crate::expr::Expr;
use crate::query::Query;
use crate::sink::{LogFlags, QueryEvent, QuerySink};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Holds the active query and the adapter used to build it.
///
/// A builder is reused across many queries but renders one at a time; it is
/// not meant to be shared between callers.
pub struct Builder {
    query: Query,
    adapter: Box<dyn Adapter>,
    log_flags: LogFlags,
    sink: Option<Arc<dyn QuerySink>>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("query", &self.query)
            .field("adapter", &self.adapter)
            .field("log_flags", &self.log_flags)
            .field("sink", &self.sink.as_ref().map(|_| "<dyn QuerySink>"))
            .finish()
    }
}

impl Builder {
    /// Create a builder for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_adapter(dialect.adapter())
    }

    /// Create a builder from a dialect selector such as `"postgres"`.
    pub fn from_selector(selector: &str) -> QbResult<Self> {
        Ok(Self::new(Dialect::parse(selector)?))
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut builder = Self::new(config.dialect).with_log_flags(config.log);
        builder.set_escaping(config.escaping);
        builder
    }

    /// Create a builder around a custom adapter.
    pub fn with_adapter(adapter: Box<dyn Adapter>) -> Self {
        Self {
            query: Query::new(),
            adapter,
            log_flags: LogFlags::NONE,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn QuerySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_log_flags(mut self, log_flags: LogFlags) -> Self {
        self.log_flags = log_flags;
        self
    }

    pub fn set_sink(&mut self, sink: Option<Arc<dyn QuerySink>>) {
        self.sink = sink;
    }

    pub fn set_log_flags(&mut self, log_flags: LogFlags) {
        self.log_flags = log_flags;
    }

    pub fn log_flags(&self) -> LogFlags {
        self.log_flags
    }

    pub fn set_escaping(&mut self, escaping: bool) {
        self.adapter.set_escaping(escaping);
    }

    pub fn escaping(&self) -> bool {
        self.adapter.escaping()
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    pub fn dialect(&self) -> Dialect {
        self.adapter.dialect()
    }

    /// The query under construction.
    pub fn current_query(&self) -> &Query {
        &self.query
    }

    /// Drop the active query and restart placeholder numbering.
    ///
    /// Query and adapter counter are always reset together.
    pub fn reset(&mut self) {
        self.query = Query::new();
        self.adapter.reset();
    }

    /// Finish the active query: reset the builder, report the query to the
    /// sink, and return it.
    pub fn query(&mut self) -> Query {
        let query = std::mem::take(&mut self.query);
        self.adapter.reset();
        self.notify(&query);
        query
    }

    fn notify(&self, query: &Query) {
        let Some(sink) = &self.sink else {
            return;
        };
        if self.log_flags.is_none() {
            return;
        }
        let sql = self.log_flags.query.then(|| query.sql());
        let event = QueryEvent {
            dialect: self.dialect(),
            sql: sql.as_deref(),
            bindings: self.log_flags.bindings.then(|| query.bindings()),
        };
        sink.on_query(&event);
    }

    /// Escape a table reference, keeping an alias after the first space verbatim.
    fn escape_table(&self, table: &str) -> String {
        match table.split_once(' ') {
            Some((name, alias)) => format!("{} {}", self.adapter.escape(name), alias),
            None => self.adapter.escape(table),
        }
    }

    fn build_expr(&mut self, expr: &Expr) -> String {
        expr.build(self.adapter.as_mut(), &mut self.query)
    }

    fn build_exprs<I, E>(&mut self, exprs: I, sep: &str) -> String
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let parts: Vec<String> = exprs
            .into_iter()
            .map(|e| self.build_expr(&e.into()))
            .collect();
        parts.join(sep)
    }

    // ==================== DML ====================

    /// `INSERT INTO table`
    pub fn insert(&mut self, table: &str) -> &mut Self {
        let clause = format!("INSERT INTO {}", self.adapter.escape(table));
        self.query.add_clause(clause);
        self
    }

    /// `(k1, k2) VALUES (p, p)`, binding each value in caller order.
    pub fn values<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut keys = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for (k, v) in pairs {
            keys.push(self.adapter.escape(k.as_ref()));
            values.push(v.into());
        }
        self.query.add_clause(format!("({})", keys.join(", ")));

        let placeholders = self.adapter.placeholders(values.len());
        self.query.add_binding(values);
        self.query
            .add_clause(format!("VALUES ({})", placeholders.join(", ")));
        self
    }

    /// `RETURNING c1, c2`. Not every dialect accepts it.
    pub fn returning<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cols = self.escape_each(columns);
        self.query.add_clause(format!("RETURNING {}", cols.join(", ")));
        self
    }

    /// `UPDATE table`
    pub fn update(&mut self, table: &str) -> &mut Self {
        let clause = format!("UPDATE {}", self.adapter.escape(table));
        self.query.add_clause(clause);
        self
    }

    /// `SET k1 = p, k2 = p`, binding each value in caller order.
    pub fn set<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut updates = Vec::new();
        for (k, v) in pairs {
            let key = self.adapter.escape(k.as_ref());
            let placeholder = self.adapter.placeholder();
            self.query.add_value(v);
            updates.push(format!("{} = {}", key, placeholder));
        }
        self.query.add_clause(format!("SET {}", updates.join(", ")));
        self
    }

    /// `DELETE FROM table`
    pub fn delete(&mut self, table: &str) -> &mut Self {
        let clause = format!("DELETE FROM {}", self.adapter.escape(table));
        self.query.add_clause(clause);
        self
    }

    // ==================== SELECT ====================

    /// `SELECT c1, c2`. Columns are used verbatim so they can hold
    /// expressions and aggregates.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cols = join_str(columns, ", ");
        self.query.add_clause(format!("SELECT {}", cols));
        self
    }

    /// `FROM t1, t2 alias`
    pub fn from<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tables: Vec<String> = tables
            .into_iter()
            .map(|t| self.escape_table(t.as_ref()))
            .collect();
        self.query.add_clause(format!("FROM {}", tables.join(", ")));
        self
    }

    fn join<I, E>(&mut self, kind: &str, table: &str, on: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let table = self.escape_table(table);
        let on = self.build_exprs(on, " ");
        self.query
            .add_clause(format!("{} JOIN {} ON {}", kind, table, on));
        self
    }

    /// `INNER JOIN table ON ...`
    pub fn inner_join<I, E>(&mut self, table: &str, on: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.join("INNER", table, on)
    }

    /// `LEFT OUTER JOIN table ON ...`
    pub fn left_outer_join<I, E>(&mut self, table: &str, on: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.join("LEFT OUTER", table, on)
    }

    /// `RIGHT OUTER JOIN table ON ...`
    pub fn right_outer_join<I, E>(&mut self, table: &str, on: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.join("RIGHT OUTER", table, on)
    }

    /// `FULL OUTER JOIN table ON ...`
    pub fn full_outer_join<I, E>(&mut self, table: &str, on: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.join("FULL OUTER", table, on)
    }

    /// `CROSS JOIN table`
    pub fn cross_join(&mut self, table: &str) -> &mut Self {
        let clause = format!("CROSS JOIN {}", self.escape_table(table));
        self.query.add_clause(clause);
        self
    }

    /// `WHERE expr`. An empty expression adds nothing.
    pub fn where_(&mut self, expr: impl Into<Expr>) -> &mut Self {
        let expr = expr.into();
        if expr.is_empty() {
            return self;
        }
        let sql = self.build_expr(&expr);
        if !sql.is_empty() {
            self.query.add_clause(format!("WHERE {}", sql));
        }
        self
    }

    /// `WHERE expression` with caller-written placeholders.
    ///
    /// `bindings` are appended verbatim and one adapter slot is reserved per
    /// binding, so later clauses keep numbering after them. On numbered
    /// dialects the expression must number its own markers starting at
    /// `adapter().placeholder_count() + 1`. Prefer [`Builder::where_`] with
    /// [`Expr::template`], which numbers `?` markers for any dialect.
    pub fn where_raw<I, V>(&mut self, expression: &str, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if expression.is_empty() {
            return self;
        }
        let bindings: Vec<Value> = bindings.into_iter().map(Into::into).collect();
        self.adapter.placeholders(bindings.len());
        self.query.add_clause(format!("WHERE {}", expression));
        self.query.add_binding(bindings);
        self
    }

    /// `ORDER BY e1, e2`
    pub fn order_by<I, S>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let clause = format!("ORDER BY {}", join_str(expressions, ", "));
        self.query.add_clause(clause);
        self
    }

    /// `GROUP BY c1, c2`
    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let clause = format!("GROUP BY {}", join_str(columns, ", "));
        self.query.add_clause(clause);
        self
    }

    /// `HAVING e1, e2`
    pub fn having<I, E>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let having = self.build_exprs(expressions, ", ");
        self.query.add_clause(format!("HAVING {}", having));
        self
    }

    /// `LIMIT count OFFSET offset`
    pub fn limit(&mut self, offset: u64, count: u64) -> &mut Self {
        self.query
            .add_clause(format!("LIMIT {} OFFSET {}", count, offset));
        self
    }

    // ==================== Aggregates ====================

    /// `AVG(column)`
    pub fn avg(&self, column: &str) -> String {
        format!("AVG({})", self.adapter.escape(column))
    }

    /// `COUNT(column)`
    pub fn count(&self, column: &str) -> String {
        format!("COUNT({})", self.adapter.escape(column))
    }

    /// `SUM(column)`
    pub fn sum(&self, column: &str) -> String {
        format!("SUM({})", self.adapter.escape(column))
    }

    /// `MIN(column)`
    pub fn min(&self, column: &str) -> String {
        format!("MIN({})", self.adapter.escape(column))
    }

    /// `MAX(column)`
    pub fn max(&self, column: &str) -> String {
        format!("MAX({})", self.adapter.escape(column))
    }

    // ==================== DDL ====================

    /// `CREATE TABLE table(` then one tab-indented clause per field and
    /// constraint, comma-separated, then `)`.
    pub fn create_table(&mut self, table: &str, fields: &[&str], constraints: &[&str]) -> &mut Self {
        let clause = format!("CREATE TABLE {}(", self.adapter.escape(table));
        self.query.add_clause(clause);

        for (i, field) in fields.iter().enumerate() {
            let mut clause = format!("\t{}", field);
            if i + 1 < fields.len() || !constraints.is_empty() {
                clause.push(',');
            }
            self.query.add_clause(clause);
        }

        for (i, constraint) in constraints.iter().enumerate() {
            let mut clause = format!("\t{}", constraint);
            if i + 1 < constraints.len() {
                clause.push(',');
            }
            self.query.add_clause(clause);
        }

        self.query.add_clause(")");
        self
    }

    /// `ALTER TABLE table`. The table name is used verbatim.
    pub fn alter_table(&mut self, table: &str) -> &mut Self {
        self.query.add_clause(format!("ALTER TABLE {}", table));
        self
    }

    /// `DROP TABLE table`
    pub fn drop_table(&mut self, table: &str) -> &mut Self {
        let clause = format!("DROP TABLE {}", self.adapter.escape(table));
        self.query.add_clause(clause);
        self
    }

    /// `ADD column type`
    pub fn add(&mut self, column: &str, column_type: &str) -> &mut Self {
        self.query
            .add_clause(format!("ADD {} {}", column, column_type));
        self
    }

    /// `DROP column`
    pub fn drop(&mut self, column: &str) -> &mut Self {
        self.query.add_clause(format!("DROP {}", column));
        self
    }

    /// `CREATE INDEX name ON table(c1,c2)`
    pub fn create_index<I, S>(&mut self, name: &str, table: &str, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cols = self.escape_each(columns);
        self.query.add_clause(format!(
            "CREATE INDEX {} ON {}({})",
            name,
            table,
            cols.join(",")
        ));
        self
    }

    fn escape_each<I, S>(&self, identifiers: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .map(|i| self.adapter.escape(i.as_ref()))
            .collect()
    }
}

fn join_str<I, S>(items: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    items.join(sep)
}
