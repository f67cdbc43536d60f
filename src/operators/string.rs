//! `cat` and `substr`.

use crate::{
    ast::{BuiltinOperator, LogicNode},
    compiler::{Call, Compiler},
    error::TranspileError,
    schema::{FieldType, OperatorCategory},
};

pub(super) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    match op {
        BuiltinOperator::Cat => cat(c, call),
        BuiltinOperator::Substr => substr(c, call),
        _ => Err(TranspileError::unsupported_operator(call.operator)),
    }
}

fn cat(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.arity(1, None)?;
    c.gate_all(OperatorCategory::String, call, operands)?;
    let parts = operands
        .iter()
        .enumerate()
        .map(|(i, node)| c.compile_operand(call, i, node))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("CONCAT({})", parts.join(", ")))
}

/// `{"substr": [s, start, length?]}` with JSON Logic's 0-based start.
/// A negative start counts from the end and is clamped to the first
/// character; a negative length drops that many characters from the end.
fn substr(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, Some(3))?;
    c.gate(OperatorCategory::String, call, 0, &operands[0])?;
    c.gate(OperatorCategory::Numeric, call, 1, &operands[1])?;
    if let Some(length) = operands.get(2) {
        c.gate(OperatorCategory::Numeric, call, 2, length)?;
    }

    let s = c.compile_operand(call, 0, &operands[0])?;
    let strlen = c.spec().string_length(&s);

    let start_offset = match integer_literal(&operands[1]) {
        Some(n) => Offset::Literal(n),
        None => Offset::Dynamic(c.compile_operand_as(
            call,
            1,
            &operands[1],
            Some(FieldType::Number),
        )?),
    };
    let start = match &start_offset {
        Offset::Literal(n) if *n >= 0 => offset(call, n.checked_add(1))?.to_string(),
        Offset::Literal(n) => {
            format!("GREATEST({} - {} + 1, 1)", strlen, offset(call, n.checked_neg())?)
        }
        Offset::Dynamic(x) => format!("({} + 1)", x),
    };

    let length = match operands.get(2) {
        None => None,
        Some(node) => Some(match integer_literal(node) {
            Some(n) if n >= 0 => n.to_string(),
            Some(k) => {
                let dropped = offset(call, k.checked_neg())?;
                match &start_offset {
                    // A start of -j leaves at most j characters
                    Offset::Literal(j) if *j < 0 => format!(
                        "GREATEST(LEAST({}, {}) - {}, 0)",
                        strlen,
                        offset(call, j.checked_neg())?,
                        dropped
                    ),
                    Offset::Literal(n) => format!(
                        "GREATEST({} - {}, 0)",
                        strlen,
                        offset(call, n.checked_add(dropped))?
                    ),
                    Offset::Dynamic(x) => format!("GREATEST({} - {} - {}, 0)", strlen, x, dropped),
                }
            }
            None => c.compile_operand_as(call, 2, node, Some(FieldType::Number))?,
        }),
    };

    Ok(c.spec().substring(&s, &start, length.as_deref()))
}

enum Offset {
    Literal(i64),
    Dynamic(String),
}

/// Offsets too large to render as a 64-bit position are rejected.
fn offset(call: &Call<'_>, value: Option<i64>) -> Result<i64, TranspileError> {
    value.ok_or_else(|| call.invalid_argument("substr offset is out of range"))
}

fn integer_literal(node: &LogicNode) -> Option<i64> {
    match node {
        LogicNode::Number(n) => n.as_i64(),
        _ => None,
    }
}
