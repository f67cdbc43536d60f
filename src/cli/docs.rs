//! Documentation content for the jsonlogic2sql CLI

use super::CliError;
use crate::ast::OperatorGroup;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    /// One group of built-in operators
    Operators(OperatorGroup),
    Schema,
    Custom,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "data" | "data-access" | "var" => Some(Self::Operators(OperatorGroup::DataAccess)),
            "logical" | "logic" => Some(Self::Operators(OperatorGroup::Logical)),
            "comparison" | "compare" => Some(Self::Operators(OperatorGroup::Comparison)),
            "arithmetic" | "math" => Some(Self::Operators(OperatorGroup::Arithmetic)),
            "string" | "strings" => Some(Self::Operators(OperatorGroup::String)),
            "array" | "arrays" => Some(Self::Operators(OperatorGroup::Array)),
            "schema" | "types" => Some(Self::Schema),
            "custom" | "custom-operators" => Some(Self::Custom),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> String {
    let mut out = String::from(
        r#"JSONLOGIC2SQL DOCUMENTATION

jsonlogic2sql compiles JSON Logic rules into SQL WHERE conditions for
BigQuery, Spanner, PostgreSQL, DuckDB and ClickHouse.

OPERATOR CATEGORIES

"#,
    );
    for group in OperatorGroup::ALL {
        let names: Vec<&str> = group.operators().map(|op| op.name()).collect();
        out.push_str(&format!("  {:<14}{}\n", group.name(), names.join(" ")));
    }
    out.push_str(
        r#"
OTHER TOPICS

  schema        Field types, type gating, literal coercion and enums
  custom        Registering custom operators from Rust
  errors        Error codes and paths

Run 'jsonlogic2sql doc <category>' for detailed documentation.
Run 'jsonlogic2sql dialects' to compare dialect renderings.
"#,
    );
    out
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Operators(group)) => Ok(match group {
            OperatorGroup::DataAccess => DATA_DOC,
            OperatorGroup::Logical => LOGICAL_DOC,
            OperatorGroup::Comparison => COMPARISON_DOC,
            OperatorGroup::Arithmetic => ARITHMETIC_DOC,
            OperatorGroup::String => STRING_DOC,
            OperatorGroup::Array => ARRAY_DOC,
        }),
        Some(DocCategory::Schema) => Ok(SCHEMA_DOC),
        Some(DocCategory::Custom) => Ok(CUSTOM_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const DATA_DOC: &str = r#"DATA ACCESS - var, missing, missing_some

VAR
  {"var": "field"}
    A column reference. Dotted names are kept as written.

    Example:
      Rule: {"var": "user.age"}
      SQL:  user.age

  {"var": ["field", default]}
    Falls back to a primitive default when the column is NULL.

    Example:
      Rule: {"var": ["status", "new"]}
      SQL:  COALESCE(status, 'new')

  Inside map, filter, all, some and none:
    {"var": ""}        the current element (elem)
    {"var": "price"}   a member of the element (elem.price)
    {"var": 0}         element at a 0-based position

  Inside reduce:
    {"var": "current"}       the element
    {"var": "accumulator"}   the running value

    Constraints:
      - Defaults must be null, a boolean, a number or a string
      - With a schema, the field must be declared

MISSING
  {"missing": ["a", "b"]}
    True when any listed field is NULL.

    Example:
      SQL: (a IS NULL OR b IS NULL)

MISSING_SOME
  {"missing_some": [min, ["a", "b", "c"]]}
    True when fewer than min of the listed fields are present.

    Examples:
      [1, ["a", "b"]]       (a IS NULL AND b IS NULL)
      [2, ["a", "b"]]       (a IS NULL OR b IS NULL)
      [2, ["a", "b", "c"]]  (CASE WHEN a IS NOT NULL THEN 1 ELSE 0 END + ...) < 2
"#;

const LOGICAL_DOC: &str = r#"LOGICAL - ==, ===, !=, !==, !, !!, and, or, if, ?:

EQUALITY
  {"==": [a, b]}     a = b
  {"===": [a, b]}    a = b
  {"!=": [a, b]}     a != b
  {"!==": [a, b]}    a <> b

  Comparing with null produces a null test:
    {"==": [{"var": "x"}, null]}    x IS NULL
    {"!=": [{"var": "x"}, null]}    x IS NOT NULL

NEGATION
  {"!": [x]}    NOT (x)

TRUTHINESS
  {"!!": [x]}
    Without a schema:
      (x IS NOT NULL AND x != FALSE AND x != 0 AND x != '')
    With a schema the check follows the field type, e.g. a boolean
    field renders x IS TRUE. Literal operands fold to TRUE or FALSE.

AND / OR
  {"and": [a, b, c]}    (a AND b AND c)
  {"or": [a, b]}        (a OR b)
    A single operand is returned without parentheses.

IF
  {"if": [c1, v1, c2, v2, else]}
    CASE WHEN c1 THEN v1 WHEN c2 THEN v2 ELSE else END
    Without a trailing else value the result is ELSE NULL.

  {"?:": [c, a, b]}
    Ternary form of if; exactly three operands.
"#;

const COMPARISON_DOC: &str = r#"COMPARISON - >, >=, <, <=

  {">": [a, b]}          a > b
  {"<": [a, b, c]}       (a < b AND b < c)

    Constraints:
      - At least two operands
      - With a schema, array, object and boolean fields are rejected
      - Numeric-looking strings compared with numeric fields are unquoted:
          {">=": [{"var": "amount"}, "50000"]}    amount >= 50000
"#;

const ARITHMETIC_DOC: &str = r#"ARITHMETIC - +, -, *, /, %, max, min

  {"+": [a, b, c]}    (a + b + c)
  {"-": [a, b]}       (a - b)
  {"*": [a, b]}       (a * b)
  {"/": [a, b]}       (a / b)
  {"%": [a, b]}       (a % b), MOD(a, b) on BigQuery and Spanner

UNARY FORMS
  {"+": ["3.14"]}              CAST('3.14' AS <numeric type>)
  {"-": [{"var": "x"}]}        -x

EXTREMES
  {"max": [a, b]}    GREATEST(a, b)
  {"min": [a, b]}    LEAST(a, b)

    Constraints:
      - With a schema, only integer and number fields are accepted
"#;

const STRING_DOC: &str = r#"STRING - cat, substr

CAT
  {"cat": ["Hello ", {"var": "name"}]}
    CONCAT('Hello ', name)

SUBSTR
  {"substr": [s, start]}
  {"substr": [s, start, length]}
    Start is 0-based and converted to SQL's 1-based positions.

    Examples (PostgreSQL):
      ["abc", 1]       SUBSTRING('abc' FROM 2)
      ["abc", 0, 2]    SUBSTRING('abc' FROM 1 FOR 2)
      ["abc", -2]      SUBSTRING('abc' FROM GREATEST(LENGTH('abc') - 2 + 1, 1))

    A negative start counts from the end and never goes before the first
    character. A negative length drops that many characters from the end.
"#;

const ARRAY_DOC: &str = r#"ARRAY - in, map, filter, reduce, all, some, none, merge

IN
  {"in": [{"var": "status"}, ["a", "b"]]}    status IN ('a', 'b')
  {"in": ["@", {"var": "email"}]}            substring containment
  {"in": ["x", {"var": "tags"}]}             array membership

    With a schema the field type of the second operand decides between
    membership and containment. An empty literal list renders FALSE.

MAP / FILTER
  {"map": [{"var": "items"}, {"*": [{"var": ""}, 2]}]}
  {"filter": [{"var": "items"}, {">": [{"var": ""}, 0]}]}

    BigQuery, Spanner, PostgreSQL:
      ARRAY(SELECT (elem * 2) FROM UNNEST(items) AS elem)
    DuckDB:
      list_transform(items, elem -> (elem * 2))
    ClickHouse:
      arrayMap(elem -> (elem * 2), items)

REDUCE
  {"reduce": [{"var": "items"}, {"+": [{"var": "accumulator"}, {"var": "current"}]}, 0]}

    DuckDB and ClickHouse fold with the full reducer. Other dialects
    support +, max and min reducers combining the accumulator with a
    per-element value:
      (SELECT 0 + COALESCE(SUM(elem), 0) FROM UNNEST(items) AS elem)

ALL / SOME / NONE
  all    NOT EXISTS (SELECT 1 FROM UNNEST(arr) AS elem WHERE NOT (cond))
  some   EXISTS (SELECT 1 FROM UNNEST(arr) AS elem WHERE cond)
  none   NOT EXISTS (SELECT 1 FROM UNNEST(arr) AS elem WHERE cond)
    ClickHouse uses arrayAll and arrayExists.

MERGE
  {"merge": [{"var": "a"}, {"var": "b"}]}
    ARRAY_CONCAT(a, b), (a || b), list_concat(a, b) or arrayConcat(a, b)
"#;

const SCHEMA_DOC: &str = r#"SCHEMA - Field Types and Gating

FORMAT
  A JSON array of fields, or {"fields": [...]}:

    [
      {"name": "amount", "type": "integer"},
      {"name": "status", "type": "enum", "allowedValues": ["active", "pending"]}
    ]

  Types: string, integer, number, boolean, array, object, enum

GATING
  numeric operators     integer, number
  string operators      string, enum, integer, number
  ordering comparisons  string, enum, integer, number
  array operators       array
  equality              any type

  Unknown fields fail with E201 before any type check.

COERCION
  Numeric-looking strings against numeric fields render unquoted;
  against string fields they stay quoted.

ENUMS
  Literals compared with ==, !=, ===, !== or listed in "in" must be
  allowed values. null is always accepted.
"#;

const CUSTOM_DOC: &str = r#"CUSTOM OPERATORS

  Custom operators are registered on a Transpiler from Rust. Handlers
  receive the operator name and the already-compiled SQL of each
  argument; dialect-aware handlers also receive the dialect.

    let transpiler = Transpiler::new(Dialect::PostgreSQL);
    transpiler.register_operator_fn("toLower", |_, args| {
        Ok(format!("LOWER({})", args[0]))
    })?;

    {"==": [{"toLower": [{"var": "status"}]}, "active"]}
      LOWER(status) = 'active'

    Constraints:
      - Names of built-in operators cannot be registered
      - Handler failures are reported as E102 with the handler's error
        as the cause
"#;

const ERRORS_DOC: &str = r#"ERRORS - Codes and Paths

  Errors print as [CODE] at PATH: message

PATHS
  $ is the expression root. Each operator appends .op, followed by [i]
  when it is element i of its parent's arguments:

    {"and": [{"unknown_op": [1]}]}
      [E100] at $.and.unknown_op[0]: unsupported operator 'unknown_op'

STRUCTURAL
  E001 invalid expression      E005 array not allowed
  E002 empty array             E006 validation
  E003 multiple keys           E007 invalid JSON
  E004 primitive not allowed   E008 maximum depth exceeded

OPERATOR
  E100 unsupported operator    E102 custom operator failed
  E101 operator requires array

TYPE / SCHEMA
  E200 type mismatch           E202 invalid field type
  E201 field not in schema     E203 invalid enum value

ARGUMENT
  E300 insufficient arguments  E303 invalid argument type
  E301 too many arguments      E304 invalid default value
  E302 invalid argument
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_lists_every_group() {
        let overview = get_docs_overview();
        for group in OperatorGroup::ALL {
            assert!(overview.contains(group.name()));
        }
        assert!(overview.contains("missing_some"));
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!(
            DocCategory::from_name("Data_Access"),
            Some(DocCategory::Operators(OperatorGroup::DataAccess))
        );
        assert_eq!(DocCategory::from_name("types"), Some(DocCategory::Schema));
        assert!(get_doc_category("array").unwrap().starts_with("ARRAY"));
        assert!(matches!(
            get_doc_category("nope"),
            Err(CliError::UnknownCategory(_))
        ));
    }
}
