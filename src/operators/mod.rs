//! Built-in operator semantics, one module per operator group.
//!
//! Every handler receives the [`Compiler`] and the [`Call`] being compiled.
//! Handlers compile their arguments through the compiler before combining
//! them, which is where schema hints shape literal rendering.

mod arithmetic;
mod array;
mod comparison;
mod data;
mod logical;
mod string;

use crate::{
    ast::{BuiltinOperator, OperatorGroup},
    compiler::{Call, Compiler},
    error::TranspileError,
};

pub(crate) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    match op.group() {
        OperatorGroup::DataAccess => data::compile(c, op, call),
        OperatorGroup::Logical => logical::compile(c, op, call),
        OperatorGroup::Comparison => comparison::compile(c, op, call),
        OperatorGroup::Arithmetic => arithmetic::compile(c, op, call),
        OperatorGroup::String => string::compile(c, op, call),
        OperatorGroup::Array => array::compile(c, op, call),
    }
}

/// `a OP b OP c`, wrapped in parentheses when there is more than one term.
fn join_terms(terms: &[String], op: &str) -> String {
    match terms {
        [single] => single.clone(),
        _ => format!("({})", terms.join(&format!(" {} ", op))),
    }
}
