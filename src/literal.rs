//! SQL rendering of JSON literals.
//!
//! - **Strings** are single-quoted with the dialect's escaping
//! - **Numbers** are rendered canonically: integers verbatim, floats
//!   normalized through [`rust_decimal`] (`1.50` → `1.5`, `1e3` → `1000`)
//! - **Coercion**: a numeric-looking string compared against an `integer` or
//!   `number` field is rendered unquoted. Nothing else is coerced.
//!
//! # Examples
//!
//! ```
//! use jsonlogic_sql::{Dialect, literal::coerce_string};
//! use jsonlogic_sql::schema::FieldType;
//!
//! let spec = Dialect::PostgreSQL.spec();
//! assert_eq!(coerce_string("50000", Some(FieldType::Integer), spec), "50000");
//! assert_eq!(coerce_string("123", Some(FieldType::String), spec), "'123'");
//! assert_eq!(coerce_string("it's", None, spec), "'it''s'");
//! ```

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Number;

use crate::{ast::LogicNode, dialect::DialectSpec, schema::FieldType};

static NUMERIC_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?\s*$").expect("numeric pattern is valid")
});

/// Whether `s` reads as a decimal number (`"42"`, `"-3.5"`, `"1e6"`).
pub fn is_numeric_string(s: &str) -> bool {
    NUMERIC_STRING.is_match(s)
}

/// Canonical text for a numeric string; falls back to the trimmed input when
/// the value does not fit a decimal.
pub fn canonical_number(s: &str) -> String {
    let trimmed = s.trim().trim_start_matches('+');
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(|d| d.normalize().to_string())
        .unwrap_or_else(|_| trimmed.to_string())
}

pub fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        n.to_string()
    } else {
        canonical_number(&n.to_string())
    }
}

/// Renders a primitive. Returns `None` for arrays and operations.
pub fn render_primitive(node: &LogicNode, spec: &DialectSpec) -> Option<String> {
    match node {
        LogicNode::Null => Some("NULL".to_string()),
        LogicNode::Bool(true) => Some("TRUE".to_string()),
        LogicNode::Bool(false) => Some("FALSE".to_string()),
        LogicNode::Number(n) => Some(render_number(n)),
        LogicNode::String(s) => Some(spec.quote(s)),
        LogicNode::Array(_) | LogicNode::Operation(_) => None,
    }
}

/// Renders a string literal for a field of `field_type`.
pub fn coerce_string(s: &str, field_type: Option<FieldType>, spec: &DialectSpec) -> String {
    match field_type {
        Some(t) if t.is_numeric() && is_numeric_string(s) => canonical_number(s),
        _ => spec.quote(s),
    }
}

/// Renders a primitive for a field of `field_type`. Returns `None` for arrays
/// and operations.
pub fn coerce_literal(
    node: &LogicNode,
    field_type: Option<FieldType>,
    spec: &DialectSpec,
) -> Option<String> {
    match node {
        LogicNode::String(s) => Some(coerce_string(s, field_type, spec)),
        other => render_primitive(other, spec),
    }
}

/// Plain text of a primitive, used to check enum membership. `None` for
/// null, arrays and operations.
pub fn literal_text(node: &LogicNode) -> Option<String> {
    match node {
        LogicNode::String(s) => Some(s.clone()),
        LogicNode::Number(n) => Some(n.to_string()),
        LogicNode::Bool(b) => Some(b.to_string()),
        LogicNode::Null | LogicNode::Array(_) | LogicNode::Operation(_) => None,
    }
}

/// JSON Logic truthiness of a literal, when it can be decided statically.
pub fn literal_truthiness(node: &LogicNode) -> Option<bool> {
    match node {
        LogicNode::Null => Some(false),
        LogicNode::Bool(b) => Some(*b),
        LogicNode::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        LogicNode::String(s) => Some(!s.is_empty()),
        LogicNode::Array(items) => Some(!items.is_empty()),
        LogicNode::Operation(_) => None,
    }
}
