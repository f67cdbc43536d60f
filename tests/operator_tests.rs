use jsonlogic_sql::{Dialect, ErrorCode, TranspileError, transpile_condition_value};
use serde_json::{Value, json};

fn sql(dialect: Dialect, rule: Value) -> String {
    transpile_condition_value(dialect, &rule).unwrap()
}

fn pg(rule: Value) -> String {
    sql(Dialect::PostgreSQL, rule)
}

fn pg_err(rule: Value) -> TranspileError {
    transpile_condition_value(Dialect::PostgreSQL, &rule).unwrap_err()
}

// ========================================================================
// Data Access
// ========================================================================

#[test]
fn test_var_reference() {
    assert_eq!(pg(json!({"var": "amount"})), "amount");
    assert_eq!(pg(json!({"var": "user.age"})), "user.age");
    assert_eq!(pg(json!({"var": ["amount"]})), "amount");
}

#[test]
fn test_var_default() {
    assert_eq!(pg(json!({"var": ["status", "new"]})), "COALESCE(status, 'new')");
    assert_eq!(pg(json!({"var": ["count", 0]})), "COALESCE(count, 0)");
}

#[test]
fn test_var_default_must_be_primitive() {
    let err = pg_err(json!({"var": ["a", {"var": "b"}]}));
    assert_eq!(err.code, ErrorCode::InvalidDefaultValue);
    assert_eq!(err.path.as_deref(), Some("$.var[1]"));
}

#[test]
fn test_var_arity() {
    assert_eq!(pg_err(json!({"var": []})).code, ErrorCode::InsufficientArgs);
    assert_eq!(pg_err(json!({"var": ["a", 1, 2]})).code, ErrorCode::TooManyArgs);
}

#[test]
fn test_element_vars_outside_iteration() {
    assert_eq!(pg_err(json!({"var": ""})).code, ErrorCode::InvalidArgument);
    assert_eq!(pg_err(json!({"var": 0})).code, ErrorCode::InvalidArgument);
}

#[test]
fn test_var_name_type() {
    assert_eq!(pg_err(json!({"var": true})).code, ErrorCode::InvalidArgType);
}

#[test]
fn test_missing() {
    assert_eq!(pg(json!({"missing": ["a", "b"]})), "(a IS NULL OR b IS NULL)");
    assert_eq!(pg(json!({"missing": "a"})), "a IS NULL");
    assert_eq!(pg(json!({"missing": [["a", "b"]]})), "(a IS NULL OR b IS NULL)");
}

#[test]
fn test_missing_requires_fields() {
    assert_eq!(pg_err(json!({"missing": []})).code, ErrorCode::InsufficientArgs);
    assert_eq!(pg_err(json!({"missing": [1]})).code, ErrorCode::InvalidArgType);
}

#[test]
fn test_missing_some_thresholds() {
    assert_eq!(
        pg(json!({"missing_some": [1, ["a", "b"]]})),
        "(a IS NULL AND b IS NULL)"
    );
    assert_eq!(
        pg(json!({"missing_some": [2, ["a", "b"]]})),
        "(a IS NULL OR b IS NULL)"
    );
    assert_eq!(
        pg(json!({"missing_some": [2, ["a", "b", "c"]]})),
        "(CASE WHEN a IS NOT NULL THEN 1 ELSE 0 END + \
         CASE WHEN b IS NOT NULL THEN 1 ELSE 0 END + \
         CASE WHEN c IS NOT NULL THEN 1 ELSE 0 END) < 2"
    );
    assert_eq!(pg(json!({"missing_some": [0, ["a"]]})), "FALSE");
    assert_eq!(pg(json!({"missing_some": [3, ["a", "b"]]})), "TRUE");
}

#[test]
fn test_missing_some_shape() {
    assert_eq!(
        pg_err(json!({"missing_some": [1, "a"]})).code,
        ErrorCode::InvalidArgType
    );
    assert_eq!(
        pg_err(json!({"missing_some": ["1", ["a"]]})).code,
        ErrorCode::InvalidArgType
    );
    assert_eq!(
        pg_err(json!({"missing_some": [1.5, ["a"]]})).code,
        ErrorCode::InvalidArgument
    );
}

// ========================================================================
// Logical
// ========================================================================

#[test]
fn test_equality_operators() {
    assert_eq!(pg(json!({"==": [{"var": "x"}, 1]})), "x = 1");
    assert_eq!(pg(json!({"===": [{"var": "x"}, 1]})), "x = 1");
    assert_eq!(pg(json!({"!=": [{"var": "x"}, 1]})), "x != 1");
    assert_eq!(pg(json!({"!==": [{"var": "x"}, 1]})), "x <> 1");
}

#[test]
fn test_equality_with_null() {
    assert_eq!(pg(json!({"==": [{"var": "x"}, null]})), "x IS NULL");
    assert_eq!(pg(json!({"==": [null, {"var": "x"}]})), "x IS NULL");
    assert_eq!(pg(json!({"!=": [{"var": "x"}, null]})), "x IS NOT NULL");
    assert_eq!(pg(json!({"!==": [{"var": "x"}, null]})), "x IS NOT NULL");
}

#[test]
fn test_literal_rendering() {
    assert_eq!(pg(json!({"==": [{"var": "x"}, true]})), "x = TRUE");
    assert_eq!(pg(json!({"==": [{"var": "x"}, 1.50]})), "x = 1.5");
    assert_eq!(pg(json!({"==": [{"var": "x"}, 1e3]})), "x = 1000");
    assert_eq!(pg(json!({"==": [{"var": "x"}, "123"]})), "x = '123'");
}

#[test]
fn test_equality_arity() {
    let err = pg_err(json!({"==": [1]}));
    assert_eq!(err.code, ErrorCode::InsufficientArgs);
    assert!(err.message.contains("=="));
    assert!(err.message.contains('2'));
    assert_eq!(pg_err(json!({"==": [1, 2, 3]})).code, ErrorCode::TooManyArgs);
}

#[test]
fn test_not() {
    assert_eq!(pg(json!({"!": [{"var": "x"}]})), "NOT (x)");
    assert_eq!(pg(json!({"!": {"var": "x"}})), "NOT (x)");
}

#[test]
fn test_truthy_without_schema() {
    assert_eq!(
        pg(json!({"!!": [{"var": "x"}]})),
        "(x IS NOT NULL AND x != FALSE AND x != 0 AND x != '')"
    );
}

#[test]
fn test_truthy_folds_literals() {
    assert_eq!(pg(json!({"!!": [0]})), "FALSE");
    assert_eq!(pg(json!({"!!": [""]})), "FALSE");
    assert_eq!(pg(json!({"!!": [null]})), "FALSE");
    assert_eq!(pg(json!({"!!": [[]]})), "FALSE");
    assert_eq!(pg(json!({"!!": []})), "FALSE");
    assert_eq!(pg(json!({"!!": ["a"]})), "TRUE");
    assert_eq!(pg(json!({"!!": [[0]]})), "TRUE");
}

#[test]
fn test_and_or() {
    assert_eq!(
        pg(json!({"and": [{"==": [{"var": "a"}, 1]}, {"==": [{"var": "b"}, 2]}]})),
        "(a = 1 AND b = 2)"
    );
    assert_eq!(
        pg(json!({"or": [{"var": "a"}, {"var": "b"}, {"var": "c"}]})),
        "(a OR b OR c)"
    );
    assert_eq!(pg(json!({"and": [{"var": "a"}]})), "a");
}

#[test]
fn test_and_requires_operands() {
    assert_eq!(pg_err(json!({"and": []})).code, ErrorCode::InsufficientArgs);
    assert_eq!(
        pg_err(json!({"or": {"var": "a"}})).code,
        ErrorCode::OperatorRequiresArray
    );
}

#[test]
fn test_if() {
    assert_eq!(
        pg(json!({"if": [{"var": "a"}, 1, 2]})),
        "CASE WHEN a THEN 1 ELSE 2 END"
    );
    assert_eq!(
        pg(json!({"if": [{"var": "a"}, 1, {"var": "b"}, 2]})),
        "CASE WHEN a THEN 1 WHEN b THEN 2 ELSE NULL END"
    );
    assert_eq!(
        pg(json!({"if": [{"var": "a"}, 1, {"var": "b"}, 2, 3]})),
        "CASE WHEN a THEN 1 WHEN b THEN 2 ELSE 3 END"
    );
}

#[test]
fn test_ternary() {
    assert_eq!(
        pg(json!({"?:": [{">": [{"var": "a"}, 0]}, "pos", "neg"]})),
        "CASE WHEN a > 0 THEN 'pos' ELSE 'neg' END"
    );
    assert_eq!(
        pg_err(json!({"?:": [{"var": "a"}, 1]})).code,
        ErrorCode::InsufficientArgs
    );
    assert_eq!(
        pg_err(json!({"?:": [{"var": "a"}, 1, 2, 3]})).code,
        ErrorCode::TooManyArgs
    );
}

// ========================================================================
// Comparison
// ========================================================================

#[test]
fn test_comparisons() {
    assert_eq!(pg(json!({">": [{"var": "a"}, 1]})), "a > 1");
    assert_eq!(pg(json!({">=": [{"var": "a"}, 1]})), "a >= 1");
    assert_eq!(pg(json!({"<": [{"var": "a"}, 1]})), "a < 1");
    assert_eq!(pg(json!({"<=": [{"var": "a"}, 1]})), "a <= 1");
}

#[test]
fn test_between() {
    assert_eq!(
        pg(json!({"<": [1, {"var": "a"}, 10]})),
        "(1 < a AND a < 10)"
    );
    assert_eq!(
        pg(json!({"<=": [1, {"var": "a"}, 10]})),
        "(1 <= a AND a <= 10)"
    );
}

#[test]
fn test_comparison_shape() {
    assert_eq!(pg_err(json!({">": [1]})).code, ErrorCode::InsufficientArgs);
    assert_eq!(pg_err(json!({">": 1})).code, ErrorCode::OperatorRequiresArray);
}

// ========================================================================
// Arithmetic
// ========================================================================

#[test]
fn test_infix_arithmetic() {
    assert_eq!(pg(json!({"+": [{"var": "a"}, 1, 2]})), "(a + 1 + 2)");
    assert_eq!(pg(json!({"-": [{"var": "a"}, 1]})), "(a - 1)");
    assert_eq!(pg(json!({"*": [{"var": "a"}, 3]})), "(a * 3)");
    assert_eq!(pg(json!({"/": [{"var": "a"}, 2]})), "(a / 2)");
    assert_eq!(pg(json!({"%": [{"var": "a"}, 2]})), "(a % 2)");
}

#[test]
fn test_arithmetic_inside_comparison() {
    assert_eq!(
        pg(json!({">": [{"*": [{"var": "price"}, {"var": "qty"}]}, 100]})),
        "(price * qty) > 100"
    );
}

#[test]
fn test_arithmetic_arity() {
    assert_eq!(pg_err(json!({"*": [2]})).code, ErrorCode::InsufficientArgs);
    assert_eq!(pg_err(json!({"+": []})).code, ErrorCode::InsufficientArgs);
}

#[test]
fn test_unary_plus() {
    assert_eq!(pg(json!({"+": ["3.14"]})), "CAST('3.14' AS NUMERIC)");
    assert_eq!(pg(json!({"+": [5]})), "5");
    assert_eq!(pg(json!({"+": [{"var": "x"}]})), "CAST(x AS NUMERIC)");
}

#[test]
fn test_unary_minus() {
    assert_eq!(pg(json!({"-": [5]})), "-5");
    assert_eq!(pg(json!({"-": [-5]})), "5");
    assert_eq!(pg(json!({"-": [{"var": "x"}]})), "-x");
}

#[test]
fn test_max_min() {
    assert_eq!(pg(json!({"max": [{"var": "a"}, {"var": "b"}]})), "GREATEST(a, b)");
    assert_eq!(pg(json!({"min": [{"var": "a"}, 0]})), "LEAST(a, 0)");
    assert_eq!(pg_err(json!({"max": []})).code, ErrorCode::InsufficientArgs);
}

// ========================================================================
// String
// ========================================================================

#[test]
fn test_cat() {
    assert_eq!(
        pg(json!({"cat": ["Hello ", {"var": "name"}]})),
        "CONCAT('Hello ', name)"
    );
}

#[test]
fn test_substr_offsets() {
    assert_eq!(pg(json!({"substr": [{"var": "s"}, 1]})), "SUBSTRING(s FROM 2)");
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, 0, 2]})),
        "SUBSTRING(s FROM 1 FOR 2)"
    );
}

#[test]
fn test_substr_negative_start() {
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, -2]})),
        "SUBSTRING(s FROM GREATEST(LENGTH(s) - 2 + 1, 1))"
    );
    // Last three characters, minus the final one
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, -3, -1]})),
        "SUBSTRING(s FROM GREATEST(LENGTH(s) - 3 + 1, 1) FOR GREATEST(LEAST(LENGTH(s), 3) - 1, 0))"
    );
}

#[test]
fn test_substr_negative_start_past_beginning() {
    // "hello" from -10 keeps the first three characters
    assert_eq!(
        pg(json!({"substr": ["hello", -10, 3]})),
        "SUBSTRING('hello' FROM GREATEST(LENGTH('hello') - 10 + 1, 1) FOR 3)"
    );
    assert_eq!(
        sql(Dialect::BigQuery, json!({"substr": ["hello", -10, 3]})),
        "SUBSTR('hello', GREATEST(LENGTH('hello') - 10 + 1, 1), 3)"
    );
}

#[test]
fn test_substr_extreme_offsets() {
    for rule in [
        json!({"substr": [{"var": "s"}, i64::MAX]}),
        json!({"substr": [{"var": "s"}, i64::MIN]}),
        json!({"substr": [{"var": "s"}, 0, i64::MIN]}),
        json!({"substr": [{"var": "s"}, i64::MIN, -1]}),
        json!({"substr": [{"var": "s"}, i64::MAX - 1, -2]}),
    ] {
        let err = pg_err(rule);
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert_eq!(err.path.as_deref(), Some("$.substr"));
    }
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, i64::MAX - 1]})),
        format!("SUBSTRING(s FROM {})", i64::MAX)
    );
}

#[test]
fn test_substr_negative_length() {
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, 1, -1]})),
        "SUBSTRING(s FROM 2 FOR GREATEST(LENGTH(s) - 2, 0))"
    );
}

#[test]
fn test_substr_dynamic_start() {
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, {"var": "i"}]})),
        "SUBSTRING(s FROM (i + 1))"
    );
    assert_eq!(
        pg(json!({"substr": [{"var": "s"}, {"var": "i"}, {"var": "n"}]})),
        "SUBSTRING(s FROM (i + 1) FOR n)"
    );
}

#[test]
fn test_substr_arity() {
    assert_eq!(
        pg_err(json!({"substr": [{"var": "s"}]})).code,
        ErrorCode::InsufficientArgs
    );
    assert_eq!(
        pg_err(json!({"substr": [{"var": "s"}, 1, 2, 3]})).code,
        ErrorCode::TooManyArgs
    );
}

// ========================================================================
// Array
// ========================================================================

#[test]
fn test_in_literal_list() {
    assert_eq!(
        pg(json!({"in": [{"var": "status"}, ["a", "b"]]})),
        "status IN ('a', 'b')"
    );
    assert_eq!(pg(json!({"in": [{"var": "x"}, []]})), "FALSE");
}

#[test]
fn test_in_string_containment() {
    assert_eq!(
        pg(json!({"in": ["@", "a@b.c"]})),
        "POSITION('@' IN 'a@b.c') > 0"
    );
    assert_eq!(
        pg(json!({"in": ["x", {"cat": [{"var": "a"}, {"var": "b"}]}]})),
        "POSITION('x' IN CONCAT(a, b)) > 0"
    );
}

#[test]
fn test_in_array_membership() {
    assert_eq!(pg(json!({"in": ["vip", {"var": "tags"}]})), "'vip' = ANY(tags)");
}

#[test]
fn test_in_arity() {
    assert_eq!(pg_err(json!({"in": ["a"]})).code, ErrorCode::InsufficientArgs);
    assert_eq!(pg_err(json!({"in": "a"})).code, ErrorCode::OperatorRequiresArray);
}

#[test]
fn test_map() {
    assert_eq!(
        pg(json!({"map": [{"var": "items"}, {"*": [{"var": ""}, 2]}]})),
        "ARRAY(SELECT (elem * 2) FROM UNNEST(items) AS elem)"
    );
}

#[test]
fn test_filter() {
    assert_eq!(
        pg(json!({"filter": [{"var": "items"}, {">": [{"var": ""}, 0]}]})),
        "ARRAY(SELECT elem FROM UNNEST(items) AS elem WHERE elem > 0)"
    );
}

#[test]
fn test_element_members() {
    assert_eq!(
        pg(json!({"filter": [{"var": "orders"}, {">": [{"var": "total"}, 100]}]})),
        "ARRAY(SELECT elem FROM UNNEST(orders) AS elem WHERE elem.total > 100)"
    );
}

#[test]
fn test_positional_var_inside_map() {
    assert_eq!(
        pg(json!({"map": [{"var": "rows"}, {"var": 0}]})),
        "ARRAY(SELECT elem[1] FROM UNNEST(rows) AS elem)"
    );
    assert_eq!(
        sql(Dialect::BigQuery, json!({"map": [{"var": "rows"}, {"var": 0}]})),
        "ARRAY(SELECT elem[OFFSET(0)] FROM UNNEST(rows) AS elem)"
    );
}

#[test]
fn test_reduce_sum() {
    assert_eq!(
        pg(json!({"reduce": [
            {"var": "items"},
            {"+": [{"var": "accumulator"}, {"var": "current"}]},
            0
        ]})),
        "(SELECT 0 + COALESCE(SUM(elem), 0) FROM UNNEST(items) AS elem)"
    );
}

#[test]
fn test_reduce_reversed_operands() {
    assert_eq!(
        pg(json!({"reduce": [
            {"var": "items"},
            {"+": [{"var": "current.qty"}, {"var": "accumulator"}]},
            10
        ]})),
        "(SELECT 10 + COALESCE(SUM(elem.qty), 0) FROM UNNEST(items) AS elem)"
    );
}

#[test]
fn test_reduce_max_min() {
    assert_eq!(
        pg(json!({"reduce": [
            {"var": "items"},
            {"max": [{"var": "accumulator"}, {"var": "current.price"}]},
            0
        ]})),
        "(SELECT GREATEST(0, COALESCE(MAX(elem.price), 0)) FROM UNNEST(items) AS elem)"
    );
    assert_eq!(
        pg(json!({"reduce": [
            {"var": "items"},
            {"min": [{"var": "accumulator"}, {"var": "current"}]},
            100
        ]})),
        "(SELECT LEAST(100, COALESCE(MIN(elem), 100)) FROM UNNEST(items) AS elem)"
    );
}

#[test]
fn test_reduce_unsupported_reducer() {
    let err = pg_err(json!({"reduce": [
        {"var": "items"},
        {"*": [{"var": "accumulator"}, {"var": "current"}]},
        1
    ]}));
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(err.path.as_deref(), Some("$.reduce"));

    let err = pg_err(json!({"reduce": [
        {"var": "items"},
        {"+": [{"var": "accumulator"}, {"var": "accumulator"}]},
        1
    ]}));
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[test]
fn test_reduce_rejects_unbound_names() {
    let err = sql_err(
        Dialect::DuckDB,
        json!({"reduce": [{"var": "items"}, {"+": [{"var": "accumulator"}, {"var": "other"}]}, 0]}),
    );
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

fn sql_err(dialect: Dialect, rule: Value) -> TranspileError {
    transpile_condition_value(dialect, &rule).unwrap_err()
}

#[test]
fn test_quantifiers() {
    let cond = json!({">": [{"var": ""}, 0]});
    assert_eq!(
        pg(json!({"all": [{"var": "items"}, cond]})),
        "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE NOT (elem > 0))"
    );
    assert_eq!(
        pg(json!({"some": [{"var": "items"}, cond]})),
        "EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE elem > 0)"
    );
    assert_eq!(
        pg(json!({"none": [{"var": "items"}, cond]})),
        "NOT EXISTS (SELECT 1 FROM UNNEST(items) AS elem WHERE elem > 0)"
    );
}

#[test]
fn test_iteration_arity() {
    assert_eq!(
        pg_err(json!({"map": [{"var": "items"}]})).code,
        ErrorCode::InsufficientArgs
    );
    assert_eq!(
        pg_err(json!({"some": {"var": "items"}})).code,
        ErrorCode::OperatorRequiresArray
    );
    assert_eq!(
        pg_err(json!({"reduce": [{"var": "items"}, {"var": "current"}]})).code,
        ErrorCode::InsufficientArgs
    );
}

#[test]
fn test_merge_fields() {
    assert_eq!(pg(json!({"merge": [{"var": "a"}, {"var": "b"}]})), "(a || b)");
    assert_eq!(pg(json!({"merge": [{"var": "a"}, [1]]})), "(a || ARRAY[1])");
    assert_eq!(pg(json!({"merge": [{"var": "a"}, 5]})), "(a || ARRAY[5])");
    assert_eq!(pg(json!({"merge": [{"var": "a"}]})), "a");
}

#[test]
fn test_merge_literals_flatten() {
    assert_eq!(pg(json!({"merge": [[1, 2], 3, ["x"]]})), "ARRAY[1, 2, 3, 'x']");
    assert_eq!(pg(json!({"merge": []})), "ARRAY[]");
}

#[test]
fn test_merge_inside_in() {
    assert_eq!(
        pg(json!({"in": ["x", {"merge": [{"var": "a"}, {"var": "b"}]}]})),
        "'x' = ANY((a || b))"
    );
}
