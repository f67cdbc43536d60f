//! SQL dialects and their rendering templates.
//!
//! Most operators render identically everywhere. The handful that do not
//! (array length, substrings, containment, array concatenation, array
//! comprehensions, literal escaping) are described by a [`DialectSpec`] row.
//! Every dialect maps to a complete row through an exhaustive `match`, so a
//! missing dialect or template is a compile error rather than a runtime
//! surprise.

use std::{fmt, str::FromStr};

/// Target SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    BigQuery,
    Spanner,
    PostgreSQL,
    DuckDB,
    ClickHouse,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::BigQuery,
        Dialect::Spanner,
        Dialect::PostgreSQL,
        Dialect::DuckDB,
        Dialect::ClickHouse,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// The rendering templates for this dialect.
    pub fn spec(self) -> &'static DialectSpec {
        match self {
            Dialect::BigQuery => &BIGQUERY,
            Dialect::Spanner => &SPANNER,
            Dialect::PostgreSQL => &POSTGRESQL,
            Dialect::DuckDB => &DUCKDB,
            Dialect::ClickHouse => &CLICKHOUSE,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected one of: bigquery, spanner, postgresql, duckdb, clickhouse)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "bigquery" | "bq" => Ok(Dialect::BigQuery),
            "spanner" => Ok(Dialect::Spanner),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSQL),
            "duckdb" => Ok(Dialect::DuckDB),
            "clickhouse" | "ch" => Ok(Dialect::ClickHouse),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// How string literals escape embedded quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteEscape {
    /// `'it''s'`
    Doubled,
    /// `'it\'s'` (backslashes are escaped too)
    Backslash,
}

/// Array literal syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLiteral {
    /// `[1, 2]`
    Brackets,
    /// `ARRAY[1, 2]`
    ArrayKeyword,
}

/// Element access by 0-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIndex {
    /// `arr[OFFSET(0)]`
    Offset,
    /// `arr[1]`
    OneBased,
}

/// Substring call shape. Start offsets handed to it are already 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substring {
    /// `NAME(s, start[, len])`
    Call(&'static str),
    /// `SUBSTRING(s FROM start [FOR len])`
    FromFor,
}

/// Substring containment test (`needle` occurs in `haystack`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// `NAME(haystack, needle) > 0`
    HaystackFirst(&'static str),
    /// `POSITION(needle IN haystack) > 0`
    PositionIn,
}

/// Array membership test (`value` is an element of `array`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// `value IN UNNEST(array)`
    InUnnest,
    /// `value = ANY(array)`
    Any,
    /// `NAME(array, value)`
    Function(&'static str),
}

/// Array concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concat {
    /// `NAME(a, b, c)`
    Variadic(&'static str),
    /// `NAME(NAME(a, b), c)`
    Binary(&'static str),
    /// `(a || b || c)`
    Operator(&'static str),
}

/// Remainder of integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulo {
    /// `(a % b)`
    Operator,
    /// `MOD(a, b)`
    Function(&'static str),
}

/// How `UNNEST` names the element column in a subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnnestAlias {
    /// `UNNEST(arr) AS elem`
    Plain,
    /// `UNNEST(arr) AS t(elem)`
    TableColumn,
}

/// Lambda-based higher-order array functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LambdaFunctions {
    pub map: &'static str,
    pub filter: &'static str,
    pub fold: &'static str,
    /// Functions take the array before the lambda: `list_filter(arr, x -> ...)`
    /// rather than `arrayFilter(x -> ..., arr)`.
    pub array_first: bool,
}

/// Strategy for `map`, `filter` and `reduce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comprehension {
    /// `ARRAY(SELECT ... FROM UNNEST(arr) AS elem ...)`
    Subquery(UnnestAlias),
    Lambda(LambdaFunctions),
}

/// Strategy for `all`, `some` and `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `EXISTS (SELECT 1 FROM UNNEST(arr) ... WHERE ...)`
    Exists(UnnestAlias),
    /// `ALL_FN(elem -> cond, arr)` / `EXISTS_FN(elem -> cond, arr)`
    Lambda {
        all: &'static str,
        exists: &'static str,
    },
}

/// One complete row of the dialect table.
#[derive(Debug)]
pub struct DialectSpec {
    pub name: &'static str,
    pub quote_escape: QuoteEscape,
    pub array_literal: ArrayLiteral,
    pub array_length: &'static str,
    pub array_index: ArrayIndex,
    pub string_length: &'static str,
    pub substring: Substring,
    pub containment: Containment,
    pub membership: Membership,
    pub concat: Concat,
    pub numeric_type: &'static str,
    pub modulo: Modulo,
    pub comprehension: Comprehension,
    pub quantifier: Quantifier,
}

static BIGQUERY: DialectSpec = DialectSpec {
    name: "bigquery",
    quote_escape: QuoteEscape::Backslash,
    array_literal: ArrayLiteral::Brackets,
    array_length: "ARRAY_LENGTH",
    array_index: ArrayIndex::Offset,
    string_length: "LENGTH",
    substring: Substring::Call("SUBSTR"),
    containment: Containment::HaystackFirst("STRPOS"),
    membership: Membership::InUnnest,
    concat: Concat::Variadic("ARRAY_CONCAT"),
    numeric_type: "FLOAT64",
    modulo: Modulo::Function("MOD"),
    comprehension: Comprehension::Subquery(UnnestAlias::Plain),
    quantifier: Quantifier::Exists(UnnestAlias::Plain),
};

static SPANNER: DialectSpec = DialectSpec {
    name: "spanner",
    quote_escape: QuoteEscape::Backslash,
    array_literal: ArrayLiteral::Brackets,
    array_length: "ARRAY_LENGTH",
    array_index: ArrayIndex::Offset,
    string_length: "CHAR_LENGTH",
    substring: Substring::Call("SUBSTR"),
    containment: Containment::HaystackFirst("STRPOS"),
    membership: Membership::InUnnest,
    concat: Concat::Variadic("ARRAY_CONCAT"),
    numeric_type: "FLOAT64",
    modulo: Modulo::Function("MOD"),
    comprehension: Comprehension::Subquery(UnnestAlias::Plain),
    quantifier: Quantifier::Exists(UnnestAlias::Plain),
};

static POSTGRESQL: DialectSpec = DialectSpec {
    name: "postgresql",
    quote_escape: QuoteEscape::Doubled,
    array_literal: ArrayLiteral::ArrayKeyword,
    array_length: "CARDINALITY",
    array_index: ArrayIndex::OneBased,
    string_length: "LENGTH",
    substring: Substring::FromFor,
    containment: Containment::PositionIn,
    membership: Membership::Any,
    concat: Concat::Operator("||"),
    numeric_type: "NUMERIC",
    modulo: Modulo::Operator,
    comprehension: Comprehension::Subquery(UnnestAlias::Plain),
    quantifier: Quantifier::Exists(UnnestAlias::Plain),
};

static DUCKDB: DialectSpec = DialectSpec {
    name: "duckdb",
    quote_escape: QuoteEscape::Doubled,
    array_literal: ArrayLiteral::Brackets,
    array_length: "LEN",
    array_index: ArrayIndex::OneBased,
    string_length: "LENGTH",
    substring: Substring::Call("SUBSTRING"),
    containment: Containment::PositionIn,
    membership: Membership::Function("list_contains"),
    concat: Concat::Binary("list_concat"),
    numeric_type: "DOUBLE",
    modulo: Modulo::Operator,
    comprehension: Comprehension::Lambda(LambdaFunctions {
        map: "list_transform",
        filter: "list_filter",
        fold: "list_reduce",
        array_first: true,
    }),
    quantifier: Quantifier::Exists(UnnestAlias::TableColumn),
};

static CLICKHOUSE: DialectSpec = DialectSpec {
    name: "clickhouse",
    quote_escape: QuoteEscape::Doubled,
    array_literal: ArrayLiteral::Brackets,
    array_length: "length",
    array_index: ArrayIndex::OneBased,
    string_length: "lengthUTF8",
    substring: Substring::Call("substring"),
    containment: Containment::HaystackFirst("position"),
    membership: Membership::Function("has"),
    concat: Concat::Variadic("arrayConcat"),
    numeric_type: "Float64",
    modulo: Modulo::Operator,
    comprehension: Comprehension::Lambda(LambdaFunctions {
        map: "arrayMap",
        filter: "arrayFilter",
        fold: "arrayFold",
        array_first: false,
    }),
    quantifier: Quantifier::Lambda {
        all: "arrayAll",
        exists: "arrayExists",
    },
};

// Template rendering. Arguments are already-rendered SQL fragments.
impl DialectSpec {
    /// Single-quoted string literal.
    pub fn quote(&self, s: &str) -> String {
        let escaped = match self.quote_escape {
            QuoteEscape::Doubled => s.replace('\'', "''"),
            QuoteEscape::Backslash => s.replace('\\', "\\\\").replace('\'', "\\'"),
        };
        format!("'{}'", escaped)
    }

    pub fn array_literal(&self, items: &[String]) -> String {
        match self.array_literal {
            ArrayLiteral::Brackets => format!("[{}]", items.join(", ")),
            ArrayLiteral::ArrayKeyword => format!("ARRAY[{}]", items.join(", ")),
        }
    }

    pub fn array_length(&self, array: &str) -> String {
        format!("{}({})", self.array_length, array)
    }

    /// Element at a 0-based position.
    pub fn array_index(&self, array: &str, index: u64) -> String {
        match self.array_index {
            ArrayIndex::Offset => format!("{}[OFFSET({})]", array, index),
            ArrayIndex::OneBased => format!("{}[{}]", array, index + 1),
        }
    }

    pub fn string_length(&self, s: &str) -> String {
        format!("{}({})", self.string_length, s)
    }

    /// Substring with a 1-based start.
    pub fn substring(&self, s: &str, start: &str, length: Option<&str>) -> String {
        match (self.substring, length) {
            (Substring::Call(name), Some(len)) => format!("{}({}, {}, {})", name, s, start, len),
            (Substring::Call(name), None) => format!("{}({}, {})", name, s, start),
            (Substring::FromFor, Some(len)) => {
                format!("SUBSTRING({} FROM {} FOR {})", s, start, len)
            }
            (Substring::FromFor, None) => format!("SUBSTRING({} FROM {})", s, start),
        }
    }

    pub fn contains(&self, haystack: &str, needle: &str) -> String {
        match self.containment {
            Containment::HaystackFirst(name) => format!("{}({}, {}) > 0", name, haystack, needle),
            Containment::PositionIn => format!("POSITION({} IN {}) > 0", needle, haystack),
        }
    }

    pub fn array_contains(&self, array: &str, value: &str) -> String {
        match self.membership {
            Membership::InUnnest => format!("{} IN UNNEST({})", value, array),
            Membership::Any => format!("{} = ANY({})", value, array),
            Membership::Function(name) => format!("{}({}, {})", name, array, value),
        }
    }

    pub fn array_concat(&self, arrays: &[String]) -> String {
        match self.concat {
            Concat::Variadic(name) => format!("{}({})", name, arrays.join(", ")),
            Concat::Binary(name) => {
                let mut iter = arrays.iter();
                let first = iter.next().cloned().unwrap_or_default();
                iter.fold(first, |acc, next| format!("{}({}, {})", name, acc, next))
            }
            Concat::Operator(op) => format!("({})", arrays.join(&format!(" {} ", op))),
        }
    }

    /// Left-associative remainder over two or more terms.
    pub fn modulo(&self, terms: &[String]) -> String {
        match self.modulo {
            Modulo::Operator => format!("({})", terms.join(" % ")),
            Modulo::Function(name) => {
                let mut iter = terms.iter();
                let first = iter.next().cloned().unwrap_or_default();
                iter.fold(first, |acc, next| format!("{}({}, {})", name, acc, next))
            }
        }
    }

    pub fn numeric_cast(&self, expr: &str) -> String {
        format!("CAST({} AS {})", expr, self.numeric_type)
    }

    /// `FROM` source that binds each element of `array` to `element`.
    pub fn unnest(alias: UnnestAlias, array: &str, element: &str) -> String {
        match alias {
            UnnestAlias::Plain => format!("UNNEST({}) AS {}", array, element),
            UnnestAlias::TableColumn => format!("UNNEST({}) AS t({})", array, element),
        }
    }
}

impl LambdaFunctions {
    /// Calls one of the lambda functions in the dialect's argument order.
    pub fn call(&self, function: &str, array: &str, lambda: &str, init: Option<&str>) -> String {
        let mut args = if self.array_first {
            vec![array, lambda]
        } else {
            vec![lambda, array]
        };
        args.extend(init);
        format!("{}({})", function, args.join(", "))
    }
}
