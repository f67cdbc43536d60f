//! Compile JSON Logic rules into SQL `WHERE` conditions.
//!
//! ```
//! use jsonlogic_sql::{Dialect, transpile};
//!
//! let sql = transpile(
//!     Dialect::PostgreSQL,
//!     r#"{"and": [{">": [{"var": "amount"}, 5000]}, {"==": [{"var": "status"}, "pending"]}]}"#,
//! )
//! .unwrap();
//! assert_eq!(sql, "WHERE (amount > 5000 AND status = 'pending')");
//! ```
//!
//! For schemas, custom operators or a non-default depth limit, configure a
//! [`Transpiler`].

pub mod ast;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod literal;
mod operators;
pub mod registry;
pub mod schema;
pub mod transpiler;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BuiltinOperator, LogicNode, OperatorGroup};
pub use dialect::{Dialect, UnknownDialect};
pub use error::{ErrorCategory, ErrorCode, TranspileError};
pub use registry::{
    CustomOperator, DialectAwareOperator, HandlerResult, OperatorHandler, OperatorRegistry,
    RegistryError,
};
pub use schema::{FieldSchema, FieldType, OperatorCategory, Schema};
pub use transpiler::Transpiler;

use serde_json::Value;

/// Compiles JSON text into `WHERE <condition>` with default settings.
pub fn transpile(dialect: Dialect, json: &str) -> Result<String, TranspileError> {
    Transpiler::new(dialect).transpile(json)
}

/// Compiles JSON text into a bare condition with default settings.
pub fn transpile_condition(dialect: Dialect, json: &str) -> Result<String, TranspileError> {
    Transpiler::new(dialect).transpile_condition(json)
}

/// Compiles decoded JSON into `WHERE <condition>` with default settings.
pub fn transpile_value(dialect: Dialect, value: &Value) -> Result<String, TranspileError> {
    Transpiler::new(dialect).transpile_value(value)
}

/// Compiles decoded JSON into a bare condition with default settings.
pub fn transpile_condition_value(dialect: Dialect, value: &Value) -> Result<String, TranspileError> {
    Transpiler::new(dialect).transpile_condition_value(value)
}
