use qb::{Adapter, Builder, Dialect, Expr, GenericAdapter, NumberedAdapter, Query, Value};

/// Collect `$n` tokens from rendered SQL, left to right.
fn numbered_tokens(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                out.push(sql[start..end].parse().unwrap());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

#[test]
fn core_pieces_stay_aligned_when_driven_by_hand() {
    let mut adapter = NumberedAdapter::new();
    let mut query = Query::new();

    query.add_clause("SELECT * FROM t");
    let first = adapter.placeholder();
    query.add_clause(format!("WHERE a = {first}"));
    query.add_binding(["x"]);

    let rest = adapter.placeholders(2);
    query.add_clause(format!("AND b IN ({})", rest.join(", ")));
    query.add_binding([10, 20]);

    assert_eq!(query.sql(), "SELECT * FROM t WHERE a = $1 AND b IN ($2, $3)");
    assert_eq!(
        query.bindings(),
        &[Value::from("x"), Value::Int(10), Value::Int(20)]
    );
}

#[test]
fn nth_placeholder_matches_nth_binding() {
    let mut b = Builder::new(Dialect::Postgres);
    b.update("accounts")
        .set([("balance", Value::from(100)), ("note", Value::from("n0"))])
        .where_(Expr::and(vec![
            Expr::eq("owner", "o3"),
            Expr::not_in("state", ["s4", "s5"]),
            Expr::or(vec![Expr::gte("limit", 6), Expr::lte("limit", 7)]),
        ]))
        .returning(["id"]);

    let q = b.query();
    assert_eq!(
        q.sql(),
        "UPDATE accounts SET balance = $1, note = $2 \
         WHERE (owner = $3 AND state NOT IN ($4,$5) AND (limit >= $6 OR limit <= $7)) \
         RETURNING id"
    );
    let tokens = numbered_tokens(&q.sql());
    assert_eq!(tokens, (1..=q.binding_count()).collect::<Vec<_>>());

    // Every binding was built from its own position.
    let expected: Vec<Value> = vec![
        Value::from(100),
        Value::from("n0"),
        Value::from("o3"),
        Value::from("s4"),
        Value::from("s5"),
        Value::from(6),
        Value::from(7),
    ];
    assert_eq!(q.bindings(), expected.as_slice());
}

#[test]
fn expressions_built_out_of_order_still_align() {
    // The WHERE expression is constructed before SET runs, but nothing is
    // numbered until it reaches the builder.
    let condition = Expr::eq("id", 2);

    let mut b = Builder::new(Dialect::Postgres);
    b.update("t").set([("v", 1)]).where_(condition);

    let q = b.query();
    assert_eq!(q.sql(), "UPDATE t SET v = $1 WHERE id = $2");
    assert_eq!(q.bindings(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn static_placeholders_for_values_list() {
    let mut adapter = GenericAdapter::new();
    let values = [10, 20, 30];
    let placeholders = adapter.placeholders(values.len());
    assert_eq!(placeholders, vec!["?", "?", "?"]);

    let mut query = Query::new();
    query.add_binding(values);
    assert_eq!(
        query.bindings(),
        &[Value::Int(10), Value::Int(20), Value::Int(30)]
    );
}

#[test]
fn every_dialect_restarts_after_query() {
    for dialect in Dialect::ALL {
        let mut b = Builder::new(dialect);
        b.select(["*"]).from(["t"]).where_(Expr::eq("a", 1));
        let first = b.query().sql();

        b.select(["*"]).from(["t"]).where_(Expr::eq("a", 1));
        let second = b.query().sql();

        assert_eq!(first, second, "dialect {dialect}");
        if dialect.numbered_placeholders() {
            assert!(second.ends_with("$1"));
        } else {
            assert!(second.ends_with('?'));
        }
    }
}
