//! Ordering comparisons: `>`, `>=`, `<`, `<=`.

use crate::{
    ast::BuiltinOperator,
    compiler::{Call, Compiler},
    error::TranspileError,
    schema::OperatorCategory,
};

pub(super) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    let symbol = match op {
        BuiltinOperator::Greater => ">",
        BuiltinOperator::GreaterEqual => ">=",
        BuiltinOperator::Less => "<",
        BuiltinOperator::LessEqual => "<=",
        _ => return Err(TranspileError::unsupported_operator(call.operator)),
    };

    let operands = call.array_arity(2, None)?;
    c.gate_all(OperatorCategory::Ordering, call, operands)?;

    // Literals are rendered for the first typed field among the operands
    let hint = c.first_field_type(operands);
    let terms = operands
        .iter()
        .enumerate()
        .map(|(i, node)| c.compile_operand_as(call, i, node, hint))
        .collect::<Result<Vec<_>, _>>()?;

    // a < b < c becomes a < b AND b < c
    let pairs: Vec<String> = terms
        .windows(2)
        .map(|pair| format!("{} {} {}", pair[0], symbol, pair[1]))
        .collect();
    Ok(super::join_terms(&pairs, "AND"))
}
