use jsonlogic_sql::{Dialect, transpile_condition_value};
use serde_json::{Value, json};

fn sql(dialect: Dialect, rule: Value) -> String {
    transpile_condition_value(dialect, &rule).unwrap()
}

/// Renders `rule` for every dialect, in `Dialect::ALL` order.
fn all(rule: Value) -> Vec<String> {
    Dialect::ALL.iter().map(|d| sql(*d, rule.clone())).collect()
}

// ========================================================================
// Names
// ========================================================================

#[test]
fn test_parse_dialect_names() {
    assert_eq!("bigquery".parse::<Dialect>().unwrap(), Dialect::BigQuery);
    assert_eq!("BigQuery".parse::<Dialect>().unwrap(), Dialect::BigQuery);
    assert_eq!("spanner".parse::<Dialect>().unwrap(), Dialect::Spanner);
    assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
    assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
    assert_eq!("DuckDB".parse::<Dialect>().unwrap(), Dialect::DuckDB);
    assert_eq!("click_house".parse::<Dialect>().unwrap(), Dialect::ClickHouse);
}

#[test]
fn test_unknown_dialect() {
    let err = "oracle".parse::<Dialect>().unwrap_err();
    assert!(err.to_string().contains("oracle"));
}

#[test]
fn test_display_round_trips() {
    for dialect in Dialect::ALL {
        assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
    }
}

// ========================================================================
// Shared Renderings
// ========================================================================

#[test]
fn test_common_operators_identical_everywhere() {
    let rule = json!({"and": [
        {">": [{"var": "amount"}, 1000]},
        {"==": [{"var": "status"}, "pending"]},
        {"!=": [{"var": "deleted_at"}, null]}
    ]});
    for rendered in all(rule) {
        assert_eq!(
            rendered,
            "(amount > 1000 AND status = 'pending' AND deleted_at IS NOT NULL)"
        );
    }
}

// ========================================================================
// Literals
// ========================================================================

#[test]
fn test_quote_escaping() {
    let rule = json!({"==": [{"var": "n"}, "it's"]});
    assert_eq!(sql(Dialect::BigQuery, rule.clone()), "n = 'it\\'s'");
    assert_eq!(sql(Dialect::Spanner, rule.clone()), "n = 'it\\'s'");
    assert_eq!(sql(Dialect::PostgreSQL, rule.clone()), "n = 'it''s'");
    assert_eq!(sql(Dialect::DuckDB, rule.clone()), "n = 'it''s'");
    assert_eq!(sql(Dialect::ClickHouse, rule), "n = 'it''s'");
}

#[test]
fn test_array_literals() {
    let rule = json!({"==": [{"var": "a"}, [1, 2]]});
    assert_eq!(sql(Dialect::BigQuery, rule.clone()), "a = [1, 2]");
    assert_eq!(sql(Dialect::PostgreSQL, rule.clone()), "a = ARRAY[1, 2]");
    assert_eq!(sql(Dialect::ClickHouse, rule), "a = [1, 2]");
}

#[test]
fn test_numeric_cast() {
    assert_eq!(
        all(json!({"+": ["3.14"]})),
        vec![
            "CAST('3.14' AS FLOAT64)",
            "CAST('3.14' AS FLOAT64)",
            "CAST('3.14' AS NUMERIC)",
            "CAST('3.14' AS DOUBLE)",
            "CAST('3.14' AS Float64)",
        ]
    );
}

#[test]
fn test_modulo() {
    assert_eq!(
        all(json!({"%": [{"var": "a"}, 2]})),
        vec!["MOD(a, 2)", "MOD(a, 2)", "(a % 2)", "(a % 2)", "(a % 2)"]
    );
    assert_eq!(
        sql(Dialect::BigQuery, json!({"%": [{"var": "a"}, 7, 3]})),
        "MOD(MOD(a, 7), 3)"
    );
}

// ========================================================================
// String Functions
// ========================================================================

#[test]
fn test_substr() {
    assert_eq!(
        all(json!({"substr": [{"var": "s"}, 1, 3]})),
        vec![
            "SUBSTR(s, 2, 3)",
            "SUBSTR(s, 2, 3)",
            "SUBSTRING(s FROM 2 FOR 3)",
            "SUBSTRING(s, 2, 3)",
            "substring(s, 2, 3)",
        ]
    );
}

#[test]
fn test_substr_negative_start_uses_string_length() {
    assert_eq!(
        all(json!({"substr": [{"var": "s"}, -2]})),
        vec![
            "SUBSTR(s, GREATEST(LENGTH(s) - 2 + 1, 1))",
            "SUBSTR(s, GREATEST(CHAR_LENGTH(s) - 2 + 1, 1))",
            "SUBSTRING(s FROM GREATEST(LENGTH(s) - 2 + 1, 1))",
            "SUBSTRING(s, GREATEST(LENGTH(s) - 2 + 1, 1))",
            "substring(s, GREATEST(lengthUTF8(s) - 2 + 1, 1))",
        ]
    );
}

#[test]
fn test_string_containment() {
    assert_eq!(
        all(json!({"in": ["@", {"cat": [{"var": "user"}, "@x.io"]}]})),
        vec![
            "STRPOS(CONCAT(user, '@x.io'), '@') > 0",
            "STRPOS(CONCAT(user, '@x.io'), '@') > 0",
            "POSITION('@' IN CONCAT(user, '@x.io')) > 0",
            "POSITION('@' IN CONCAT(user, '@x.io')) > 0",
            "position(CONCAT(user, '@x.io'), '@') > 0",
        ]
    );
}

// ========================================================================
// Arrays
// ========================================================================

#[test]
fn test_array_membership() {
    assert_eq!(
        all(json!({"in": ["vip", {"var": "tags"}]})),
        vec![
            "'vip' IN UNNEST(tags)",
            "'vip' IN UNNEST(tags)",
            "'vip' = ANY(tags)",
            "list_contains(tags, 'vip')",
            "has(tags, 'vip')",
        ]
    );
}

#[test]
fn test_merge() {
    assert_eq!(
        all(json!({"merge": [{"var": "a"}, {"var": "b"}, {"var": "c"}]})),
        vec![
            "ARRAY_CONCAT(a, b, c)",
            "ARRAY_CONCAT(a, b, c)",
            "(a || b || c)",
            "list_concat(list_concat(a, b), c)",
            "arrayConcat(a, b, c)",
        ]
    );
}

#[test]
fn test_map() {
    assert_eq!(
        all(json!({"map": [{"var": "items"}, {"*": [{"var": ""}, 2]}]})),
        vec![
            "ARRAY(SELECT (elem * 2) FROM UNNEST(items) AS elem)",
            "ARRAY(SELECT (elem * 2) FROM UNNEST(items) AS elem)",
            "ARRAY(SELECT (elem * 2) FROM UNNEST(items) AS elem)",
            "list_transform(items, elem -> (elem * 2))",
            "arrayMap(elem -> (elem * 2), items)",
        ]
    );
}

#[test]
fn test_filter() {
    assert_eq!(
        all(json!({"filter": [{"var": "items"}, {">": [{"var": ""}, 0]}]})),
        vec![
            "ARRAY(SELECT elem FROM UNNEST(items) AS elem WHERE elem > 0)",
            "ARRAY(SELECT elem FROM UNNEST(items) AS elem WHERE elem > 0)",
            "ARRAY(SELECT elem FROM UNNEST(items) AS elem WHERE elem > 0)",
            "list_filter(items, elem -> elem > 0)",
            "arrayFilter(elem -> elem > 0, items)",
        ]
    );
}

#[test]
fn test_reduce() {
    let rule = json!({"reduce": [
        {"var": "items"},
        {"+": [{"var": "accumulator"}, {"var": "current"}]},
        0
    ]});
    assert_eq!(
        all(rule),
        vec![
            "(SELECT 0 + COALESCE(SUM(elem), 0) FROM UNNEST(items) AS elem)",
            "(SELECT 0 + COALESCE(SUM(elem), 0) FROM UNNEST(items) AS elem)",
            "(SELECT 0 + COALESCE(SUM(elem), 0) FROM UNNEST(items) AS elem)",
            "list_reduce(items, (acc, elem) -> (acc + elem), 0)",
            "arrayFold((acc, elem) -> (acc + elem), items, 0)",
        ]
    );
}

#[test]
fn test_lambda_reduce_accepts_any_reducer() {
    let rule = json!({"reduce": [
        {"var": "items"},
        {"*": [{"var": "accumulator"}, {"var": "current"}]},
        1
    ]});
    assert_eq!(
        sql(Dialect::ClickHouse, rule.clone()),
        "arrayFold((acc, elem) -> (acc * elem), items, 1)"
    );
    assert!(transpile_condition_value(Dialect::BigQuery, &rule).is_err());
}

#[test]
fn test_quantifiers() {
    let cond = json!({">": [{"var": "score"}, 50]});
    assert_eq!(
        all(json!({"all": [{"var": "items"}, cond]})),
        vec![
            "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE NOT (elem.score > 50))",
            "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE NOT (elem.score > 50))",
            "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE NOT (elem.score > 50))",
            "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS t(elem) WHERE NOT (elem.score > 50))",
            "arrayAll(elem -> elem.score > 50, items)",
        ]
    );
    assert_eq!(
        sql(Dialect::DuckDB, json!({"some": [{"var": "items"}, cond]})),
        "EXISTS (SELECT 1 FROM UNNEST(items) AS t(elem) WHERE elem.score > 50)"
    );
    assert_eq!(
        sql(Dialect::ClickHouse, json!({"some": [{"var": "items"}, cond]})),
        "arrayExists(elem -> elem.score > 50, items)"
    );
    assert_eq!(
        sql(Dialect::ClickHouse, json!({"none": [{"var": "items"}, cond]})),
        "NOT arrayExists(elem -> elem.score > 50, items)"
    );
}

#[test]
fn test_truthy_array_length() {
    use jsonlogic_sql::{FieldSchema, FieldType, Schema, Transpiler};

    let schema = std::sync::Arc::new(
        Schema::new(vec![FieldSchema::new("tags", FieldType::Array)]).unwrap(),
    );
    let rendered: Vec<String> = Dialect::ALL
        .iter()
        .map(|d| {
            Transpiler::new(*d)
                .with_schema(schema.clone())
                .transpile_condition(r#"{"!!": [{"var": "tags"}]}"#)
                .unwrap()
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            "(tags IS NOT NULL AND ARRAY_LENGTH(tags) > 0)",
            "(tags IS NOT NULL AND ARRAY_LENGTH(tags) > 0)",
            "(tags IS NOT NULL AND CARDINALITY(tags) > 0)",
            "(tags IS NOT NULL AND LEN(tags) > 0)",
            "(tags IS NOT NULL AND length(tags) > 0)",
        ]
    );
}
