use qb::{Builder, BuilderConfig, CaptureSink, CompositeSink, Dialect, Expr, LogFlags, WriterSink};
use std::sync::Arc;

const CONFIG: &str = r#"
dialect = "postgres"
escaping = true

[log]
query = true
bindings = true
"#;

#[test]
fn builder_from_toml_config_logs_every_query() {
    let config = BuilderConfig::from_toml_str(CONFIG).unwrap();
    let sink = Arc::new(CaptureSink::new());
    let mut b = Builder::from_config(&config).with_sink(sink.clone());

    b.insert("users").values([("name", "ann")]);
    let first = b.query();
    b.select(["*"]).from(["users"]).where_(Expr::eq("name", "ann"));
    let second = b.query();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].sql.as_deref(), Some(first.sql().as_str()));
    assert_eq!(events[0].bindings.as_deref(), Some(first.bindings()));
    assert_eq!(
        events[1].sql.as_deref(),
        Some(r#"SELECT * FROM "users" WHERE "name" = $1"#)
    );
    assert_eq!(events[1].bindings.as_deref(), Some(second.bindings()));
}

#[test]
fn unknown_dialect_in_config_fails_fast() {
    assert!(BuilderConfig::from_toml_str(r#"dialect = "db2""#).is_err());
    assert!(Builder::from_selector("db2").unwrap_err().is_unknown_dialect());
}

#[test]
fn sinks_are_shared_across_builders() {
    let sink = Arc::new(CaptureSink::new());
    let mut pg = Builder::new(Dialect::Postgres)
        .with_sink(sink.clone())
        .with_log_flags(LogFlags::QUERY);
    let mut lite = Builder::new(Dialect::Sqlite)
        .with_sink(sink.clone())
        .with_log_flags(LogFlags::QUERY);

    pg.delete("a").where_(Expr::eq("id", 1));
    pg.query();
    lite.delete("a").where_(Expr::eq("id", 1));
    lite.query();

    let events = sink.events();
    assert_eq!(events[0].dialect, Dialect::Postgres);
    assert_eq!(events[0].sql.as_deref(), Some("DELETE FROM a WHERE id = $1"));
    assert_eq!(events[1].dialect, Dialect::Sqlite);
    assert_eq!(events[1].sql.as_deref(), Some("DELETE FROM a WHERE id = ?"));
}

#[test]
fn composite_sink_with_capture() {
    let capture = Arc::new(CaptureSink::new());
    let composite = CompositeSink::new()
        .add(capture.clone())
        .add(WriterSink::new(std::io::sink()));
    let mut b = Builder::new(Dialect::MySql)
        .with_sink(Arc::new(composite))
        .with_log_flags(LogFlags::BINDINGS);

    b.select(["*"]).from(["t"]).where_(Expr::in_list("id", [1, 2, 3]));
    b.query();

    let events = capture.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sql, None);
    assert_eq!(events[0].bindings.as_ref().map(Vec::len), Some(3));
}
