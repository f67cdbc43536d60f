//! # JSON Logic - Abstract Syntax Tree
//!
//! A JSON Logic rule is ordinary JSON where every object is an operation:
//! a single key naming the operator, mapped to its arguments.
//!
//! ```text
//! {"and": [
//!     {">":  [{"var": "amount"}, 5000]},
//!     {"==": [{"var": "status"}, "pending"]}
//! ]}
//! ```
//!
//! - **[node]** - [`LogicNode`], the validated tree built from decoded JSON
//! - **[operators]** - the fixed table of built-in operator names
//!
//! Conversion from `serde_json::Value` is where structural validation
//! happens: objects must have exactly one key and nesting is bounded.

pub mod node;
pub mod operators;

pub use node::{LogicNode, Operation};
pub use operators::{BUILTIN_OPERATOR_NAMES, BuiltinOperator, OperatorGroup, is_builtin};
