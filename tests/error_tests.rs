use std::error::Error;

use jsonlogic_sql::{
    Dialect, ErrorCategory, ErrorCode, LogicNode, TranspileError, Transpiler, transpile,
    transpile_condition_value,
};
use serde_json::{Value, json};

fn err(rule: Value) -> TranspileError {
    transpile_condition_value(Dialect::PostgreSQL, &rule).unwrap_err()
}

/// `{"!": [{"!": [ ... {"var": "x"} ... ]}]}` nested `depth` times.
fn nested_not(depth: usize) -> Value {
    let mut rule = json!({"var": "x"});
    for _ in 0..depth {
        rule = json!({"!": [rule]});
    }
    rule
}

// ========================================================================
// Paths
// ========================================================================

#[test]
fn test_unknown_operator_path() {
    let e = err(json!({"and": [{"unknown_op": [1]}]}));
    assert_eq!(e.code, ErrorCode::UnsupportedOperator);
    assert_eq!(e.path.as_deref(), Some("$.and.unknown_op[0]"));
    assert_eq!(e.operator.as_deref(), Some("unknown_op"));
}

#[test]
fn test_unknown_operator_at_root() {
    let e = err(json!({"nope": [1]}));
    assert_eq!(e.path.as_deref(), Some("$.nope"));
}

#[test]
fn test_nested_arity_path() {
    let e = err(json!({"and": [{"==": [1, 1]}, {"or": [{">": [1]}]}]}));
    assert_eq!(e.code, ErrorCode::InsufficientArgs);
    assert_eq!(e.path.as_deref(), Some("$.and.or[1].>[0]"));
    assert_eq!(e.operator.as_deref(), Some(">"));
}

#[test]
fn test_bare_argument_path() {
    let e = err(json!({"!": {"bogus": 1}}));
    assert_eq!(e.path.as_deref(), Some("$.!.bogus"));
}

#[test]
fn test_requires_array_path() {
    let e = err(json!({"if": [true, {"map": {"var": "x"}}, 0]}));
    assert_eq!(e.code, ErrorCode::OperatorRequiresArray);
    assert_eq!(e.path.as_deref(), Some("$.if.map[1]"));
}

// ========================================================================
// Structural Errors
// ========================================================================

#[test]
fn test_invalid_json() {
    let e = transpile(Dialect::BigQuery, "{invalid json}").unwrap_err();
    assert_eq!(e.code, ErrorCode::InvalidJson);
    assert_eq!(e.category(), ErrorCategory::Structural);
    assert!(e.source().is_some());
}

#[test]
fn test_root_must_be_operation() {
    let e = transpile(Dialect::BigQuery, "42").unwrap_err();
    assert_eq!(e.code, ErrorCode::PrimitiveNotAllowed);
    assert_eq!(e.path.as_deref(), Some("$"));

    let e = transpile(Dialect::BigQuery, r#""amount""#).unwrap_err();
    assert_eq!(e.code, ErrorCode::PrimitiveNotAllowed);

    let e = transpile(Dialect::BigQuery, "[1, 2]").unwrap_err();
    assert_eq!(e.code, ErrorCode::ArrayNotAllowed);
}

#[test]
fn test_multiple_keys() {
    let e = err(json!({"==": [1, 1], "!=": [1, 2]}));
    assert_eq!(e.code, ErrorCode::MultipleKeys);
    assert_eq!(e.path.as_deref(), Some("$"));

    let e = err(json!({}));
    assert_eq!(e.code, ErrorCode::MultipleKeys);

    let e = err(json!({"and": [{"a": 1, "b": 2}]}));
    assert_eq!(e.code, ErrorCode::MultipleKeys);
    assert_eq!(e.path.as_deref(), Some("$.and[0]"));
}

#[test]
fn test_max_depth_default() {
    let e = err(nested_not(200));
    assert_eq!(e.code, ErrorCode::MaxDepthExceeded);
}

#[test]
fn test_max_depth_configured() {
    let shallow = Transpiler::new(Dialect::PostgreSQL).with_max_depth(5);
    assert_eq!(shallow.max_depth(), 5);
    let e = shallow.transpile_value(&nested_not(10)).unwrap_err();
    assert_eq!(e.code, ErrorCode::MaxDepthExceeded);
    assert!(shallow.transpile_value(&nested_not(1)).is_ok());

    let deep = Transpiler::new(Dialect::PostgreSQL).with_max_depth(1000);
    let sql = deep.transpile_condition_value(&nested_not(60)).unwrap();
    assert!(sql.starts_with("NOT (NOT ("));
    assert!(sql.contains("(x)"));
}

#[test]
fn test_max_depth_text_input() {
    let t = Transpiler::new(Dialect::PostgreSQL);
    let sql = t.transpile(&nested_not(80).to_string()).unwrap();
    assert!(sql.starts_with("WHERE NOT (NOT ("));

    let e = t.transpile(&nested_not(200).to_string()).unwrap_err();
    assert_eq!(e.code, ErrorCode::MaxDepthExceeded);

    let e = Transpiler::new(Dialect::PostgreSQL)
        .with_max_depth(5)
        .transpile_condition(&nested_not(10).to_string())
        .unwrap_err();
    assert_eq!(e.code, ErrorCode::MaxDepthExceeded);

    let deep = Transpiler::new(Dialect::PostgreSQL).with_max_depth(1000);
    assert!(deep.transpile(&nested_not(90).to_string()).is_ok());
}

#[test]
fn test_max_depth_on_prebuilt_tree() {
    let mut node = LogicNode::var("x");
    for _ in 0..50 {
        node = LogicNode::op("!", LogicNode::Array(vec![node]));
    }
    let e = Transpiler::new(Dialect::DuckDB)
        .with_max_depth(10)
        .compile_node(&node)
        .unwrap_err();
    assert_eq!(e.code, ErrorCode::MaxDepthExceeded);
}

// ========================================================================
// Error Values
// ========================================================================

#[test]
fn test_display_format() {
    let e = err(json!({"and": [{"unknown_op": [1]}]}));
    assert_eq!(
        e.to_string(),
        "[E100] at $.and.unknown_op[0]: unsupported operator 'unknown_op'"
    );
}

#[test]
fn test_annotation_returns_copies() {
    let original = TranspileError::new(ErrorCode::InvalidArgument, "bad");
    let located = original.with_path("$.x").with_operator("x");
    assert_eq!(original.path, None);
    assert_eq!(original.operator, None);
    assert_eq!(located.path.as_deref(), Some("$.x"));
    assert_eq!(located.operator.as_deref(), Some("x"));
    assert_eq!(located.code, ErrorCode::InvalidArgument);
}

#[test]
fn test_codes_are_stable() {
    let expected = [
        (ErrorCode::InvalidExpression, "E001", ErrorCategory::Structural),
        (ErrorCode::InvalidJson, "E007", ErrorCategory::Structural),
        (ErrorCode::MaxDepthExceeded, "E008", ErrorCategory::Structural),
        (ErrorCode::UnsupportedOperator, "E100", ErrorCategory::Operator),
        (ErrorCode::CustomOperatorFailed, "E102", ErrorCategory::Operator),
        (ErrorCode::FieldNotInSchema, "E201", ErrorCategory::TypeSchema),
        (ErrorCode::InvalidEnumValue, "E203", ErrorCategory::TypeSchema),
        (ErrorCode::InsufficientArgs, "E300", ErrorCategory::Argument),
        (ErrorCode::InvalidDefaultValue, "E304", ErrorCategory::Argument),
    ];
    for (code, text, category) in expected {
        assert_eq!(code.as_str(), text);
        assert_eq!(code.to_string(), text);
        assert_eq!(code.category(), category);
    }
}

#[test]
fn test_no_partial_output() {
    // The failing branch is last; nothing from the earlier branches leaks out
    let result = transpile_condition_value(
        Dialect::PostgreSQL,
        &json!({"and": [{"==": [{"var": "a"}, 1]}, {"unknown_op": []}]}),
    );
    assert!(result.is_err());
}
