//! Clause and binding accumulator.

use crate::value::Value;

/// An ordered list of SQL fragments plus the values bound to their placeholders.
///
/// `Query` does not know about placeholders or dialects. Whoever appends a
/// fragment containing placeholders must append the matching values in the
/// same left-to-right order, so the Nth placeholder in [`Query::sql`] lines up
/// with the Nth entry of [`Query::bindings`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: Vec<String>,
    bindings: Vec<Value>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment verbatim.
    pub fn add_clause(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    /// Append values to the binding list, in iteration order.
    pub fn add_binding<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bindings.extend(values.into_iter().map(Into::into));
        self
    }

    /// Append a single value to the binding list.
    pub fn add_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.bindings.push(value.into());
        self
    }

    /// Render all clauses joined by a single space.
    pub fn sql(&self) -> String {
        self.clauses.join(" ")
    }

    /// Bound values in insertion order.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// Clause fragments in insertion order.
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Number of clause fragments added so far.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Number of bound values; matches the placeholders reserved for this query.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// `true` when no clause has been added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Consume the query, returning the rendered SQL and its bindings.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql(), self.bindings)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.bindings
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clauses_join_in_order() {
        let mut q = Query::new();
        q.add_clause("SELECT *").add_clause("FROM users").add_clause("LIMIT 1");
        assert_eq!(q.sql(), "SELECT * FROM users LIMIT 1");
        assert_eq!(q.sql(), q.sql());
        assert_eq!(q.clause_count(), 3);
    }

    #[test]
    fn empty_query_renders_empty_string() {
        let q = Query::new();
        assert!(q.is_empty());
        assert_eq!(q.sql(), "");
        assert!(q.bindings().is_empty());
    }

    #[test]
    fn bindings_append_in_order() {
        let mut q = Query::new();
        q.add_binding([1]);
        q.add_binding([2, 3]);
        q.add_binding(Vec::<i32>::new());
        assert_eq!(
            q.bindings(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn into_parts_returns_both() {
        let mut q = Query::new();
        q.add_clause("WHERE id = ?").add_value(7i64);
        let (sql, bindings) = q.into_parts();
        assert_eq!(sql, "WHERE id = ?");
        assert_eq!(bindings, vec![Value::Int(7)]);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn params_ref_follows_binding_order() {
        use bytes::BytesMut;
        use tokio_postgres::types::Type;

        let mut q = Query::new();
        q.add_clause("SELECT * FROM t WHERE id = $1 AND name = $2")
            .add_binding([Value::from(9), Value::from("ann")]);

        let params = q.params_ref();
        assert_eq!(params.len(), 2);

        let mut out = BytesMut::new();
        params[0].to_sql_checked(&Type::INT4, &mut out).unwrap();
        assert_eq!(&out[..], &9i32.to_be_bytes());

        out.clear();
        params[1].to_sql_checked(&Type::TEXT, &mut out).unwrap();
        assert_eq!(&out[..], b"ann");
    }
}
