//! Arithmetic: `+ - * / %`, `max` and `min`.

use crate::{
    ast::{BuiltinOperator, LogicNode},
    compiler::{Call, Compiler},
    error::TranspileError,
    literal,
    schema::{FieldType, OperatorCategory},
};

pub(super) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    match op {
        BuiltinOperator::Add => {
            let operands = call.arity(1, None)?;
            match operands {
                [single] => unary_plus(c, call, single),
                _ => infix(c, call, operands, "+"),
            }
        }
        BuiltinOperator::Subtract => {
            let operands = call.arity(1, None)?;
            match operands {
                [single] => unary_minus(c, call, single),
                _ => infix(c, call, operands, "-"),
            }
        }
        BuiltinOperator::Multiply => infix(c, call, call.arity(2, None)?, "*"),
        BuiltinOperator::Divide => infix(c, call, call.arity(2, None)?, "/"),
        BuiltinOperator::Modulo => {
            let terms = numeric_terms(c, call, call.arity(2, None)?)?;
            Ok(c.spec().modulo(&terms))
        }
        BuiltinOperator::Max => extremum(c, call, "GREATEST"),
        BuiltinOperator::Min => extremum(c, call, "LEAST"),
        _ => Err(TranspileError::unsupported_operator(call.operator)),
    }
}

/// Numeric operands: fields are gated, numeric-looking strings unquoted.
fn numeric_terms(
    c: &mut Compiler<'_>,
    call: &Call<'_>,
    operands: &[LogicNode],
) -> Result<Vec<String>, TranspileError> {
    c.gate_all(OperatorCategory::Numeric, call, operands)?;
    operands
        .iter()
        .enumerate()
        .map(|(i, node)| c.compile_operand_as(call, i, node, Some(FieldType::Number)))
        .collect()
}

fn infix(
    c: &mut Compiler<'_>,
    call: &Call<'_>,
    operands: &[LogicNode],
    symbol: &str,
) -> Result<String, TranspileError> {
    let terms = numeric_terms(c, call, operands)?;
    Ok(format!("({})", terms.join(&format!(" {} ", symbol))))
}

/// `{"+": ["3.14"]}` casts to a number.
fn unary_plus(c: &mut Compiler<'_>, call: &Call<'_>, operand: &LogicNode) -> Result<String, TranspileError> {
    c.gate(OperatorCategory::Numeric, call, 0, operand)?;
    match operand {
        LogicNode::String(s) => Ok(c.spec().numeric_cast(&c.spec().quote(s))),
        LogicNode::Number(n) => Ok(literal::render_number(n)),
        other => {
            let typed_numeric = c.field_of(other).is_some_and(|(_, t)| t.is_numeric());
            let x = c.compile_operand(call, 0, other)?;
            Ok(if typed_numeric {
                x
            } else {
                c.spec().numeric_cast(&x)
            })
        }
    }
}

fn unary_minus(c: &mut Compiler<'_>, call: &Call<'_>, operand: &LogicNode) -> Result<String, TranspileError> {
    let x = numeric_terms(c, call, std::slice::from_ref(operand))?.remove(0);
    let negated = match operand {
        LogicNode::Number(_) => match x.strip_prefix('-') {
            Some(positive) => positive.to_string(),
            None => format!("-{}", x),
        },
        _ if operand.var_name().is_some() => format!("-{}", x),
        _ => format!("-({})", x),
    };
    Ok(negated)
}

/// `max` / `min` over one or more operands.
fn extremum(c: &mut Compiler<'_>, call: &Call<'_>, function: &str) -> Result<String, TranspileError> {
    let operands = call.arity(1, None)?;
    let terms = numeric_terms(c, call, operands)?;
    Ok(format!("{}({})", function, terms.join(", ")))
}
