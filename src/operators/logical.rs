//! Equality, negation, truthiness, `and`/`or` and `if`.

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
        BuiltinOperator::Equal | BuiltinOperator::StrictEqual => equality(c, call, "=", "IS NULL"),
        BuiltinOperator::NotEqual => equality(c, call, "!=", "IS NOT NULL"),
        BuiltinOperator::StrictNotEqual => equality(c, call, "<>", "IS NOT NULL"),
        BuiltinOperator::Not => not(c, call),
        BuiltinOperator::Truthy => truthy(c, call),
        BuiltinOperator::And => connective(c, call, "AND"),
        BuiltinOperator::Or => connective(c, call, "OR"),
        BuiltinOperator::If => conditional(c, call),
        BuiltinOperator::Ternary => {
            call.array_arity(3, Some(3))?;
            conditional(c, call)
        }
        _ => Err(TranspileError::unsupported_operator(call.operator)),
    }
}

/// `==`, `===`, `!=` and `!==`. A `null` operand turns the comparison into a
/// null test; enum fields only accept their allowed values.
fn equality(
    c: &mut Compiler<'_>,
    call: &Call<'_>,
    symbol: &str,
    null_test: &str,
) -> Result<String, TranspileError> {
    let operands = call.arity(2, Some(2))?;
    c.gate_all(OperatorCategory::Equality, call, operands)?;
    let (left, right) = (&operands[0], &operands[1]);

    if matches!(right, LogicNode::Null) {
        let subject = c.compile_operand(call, 0, left)?;
        return Ok(format!("{} {}", subject, null_test));
    }
    if matches!(left, LogicNode::Null) {
        let subject = c.compile_operand(call, 1, right)?;
        return Ok(format!("{} {}", subject, null_test));
    }

    let left_field = c.field_of(left);
    let right_field = c.field_of(right);
    if let Some((name, FieldType::Enum)) = left_field {
        c.validate_enum(name, call, call.operand_path(1), right)?;
    }
    if let Some((name, FieldType::Enum)) = right_field {
        c.validate_enum(name, call, call.operand_path(0), left)?;
    }

    let lhs = c.compile_operand_as(call, 0, left, right_field.map(|(_, t)| t))?;
    let rhs = c.compile_operand_as(call, 1, right, left_field.map(|(_, t)| t))?;
    Ok(format!("{} {} {}", lhs, symbol, rhs))
}

/// `{"!": [x]}` or `{"!": x}`.
fn not(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.arity(1, Some(1))?;
    let inner = c.compile_operand(call, 0, &operands[0])?;
    Ok(format!("NOT ({})", inner))
}

/// `!!` casts to a boolean following JSON Logic truthiness. With a schema
/// the check is specialized to the field's type.
fn truthy(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    // {"!!": []} has no operand at all, which is falsy
    if matches!(call.args, LogicNode::Array(items) if items.is_empty()) {
        return Ok("FALSE".to_string());
    }
    let operands = call.arity(1, Some(1))?;
    let operand = &operands[0];

    if let Some(truth) = literal::literal_truthiness(operand) {
        return Ok(if truth { "TRUE" } else { "FALSE" }.to_string());
    }

    let field_type = c.field_of(operand).map(|(_, t)| t);
    let x = c.compile_operand(call, 0, operand)?;
    let rendered = match field_type {
        Some(FieldType::Boolean) => format!("{} IS TRUE", x),
        Some(FieldType::String | FieldType::Enum) => {
            format!("({} IS NOT NULL AND {} != '')", x, x)
        }
        Some(FieldType::Integer | FieldType::Number) => {
            format!("({} IS NOT NULL AND {} != 0)", x, x)
        }
        Some(FieldType::Array) => {
            format!("({} IS NOT NULL AND {} > 0)", x, c.spec().array_length(&x))
        }
        Some(FieldType::Object) => format!("{} IS NOT NULL", x),
        None => format!(
            "({} IS NOT NULL AND {} != FALSE AND {} != 0 AND {} != '')",
            x, x, x, x
        ),
    };
    Ok(rendered)
}

/// `and` / `or` over one or more operands.
fn connective(c: &mut Compiler<'_>, call: &Call<'_>, keyword: &str) -> Result<String, TranspileError> {
    let operands = call.array_arity(1, None)?;
    let terms = operands
        .iter()
        .enumerate()
        .map(|(i, node)| c.compile_operand(call, i, node))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(super::join_terms(&terms, keyword))
}

/// `{"if": [c1, v1, c2, v2, ..., else]}`. Without a trailing else value the
/// result is `NULL`.
fn conditional(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, None)?;

    let mut sql = String::from("CASE");
    let mut i = 0;
    while i + 1 < operands.len() {
        let condition = c.compile_operand(call, i, &operands[i])?;
        let value = c.compile_operand(call, i + 1, &operands[i + 1])?;
        sql.push_str(&format!(" WHEN {} THEN {}", condition, value));
        i += 2;
    }
    let otherwise = match operands.get(i) {
        Some(node) => c.compile_operand(call, i, node)?,
        None => "NULL".to_string(),
    };
    sql.push_str(&format!(" ELSE {} END", otherwise));
    Ok(sql)
}
