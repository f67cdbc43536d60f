//! `var`, `missing` and `missing_some`.

use serde_json::Number;

use crate::{
    ast::{BuiltinOperator, LogicNode},
    compiler::{Call, Compiler, Scope, list_item_path},
    error::{ErrorCode, TranspileError},
    literal,
    schema::FieldType,
};

pub(super) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    match op {
        BuiltinOperator::Var => var(c, call),
        BuiltinOperator::Missing => missing(c, call),
        BuiltinOperator::MissingSome => missing_some(c, call),
        _ => Err(TranspileError::unsupported_operator(call.operator)),
    }
}

/// `{"var": "a.b"}`, `{"var": ["a", default]}` or `{"var": 0}`.
fn var(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let (name, default) = match call.args {
        LogicNode::Array(items) => match items.as_slice() {
            [] => return Err(TranspileError::insufficient_args("var", 1, 0).with_path(&call.path)),
            [name] => (name, None),
            [name, default] => (name, Some(default)),
            _ => {
                return Err(
                    TranspileError::too_many_args("var", 2, items.len()).with_path(&call.path)
                );
            }
        },
        other => (other, None),
    };

    let reference = match name {
        LogicNode::String(field) => field_reference(c, call, field)?,
        LogicNode::Number(index) => positional_reference(c, call, index)?,
        other => {
            return Err(call.invalid_arg_type(
                0,
                format!("var name must be a string or number, got {}", other.type_name()),
            ));
        }
    };

    let Some(default) = default else {
        return Ok(reference);
    };
    if !default.is_literal() {
        return Err(TranspileError::new(
            ErrorCode::InvalidDefaultValue,
            format!(
                "var default must be a primitive value, got {}",
                default.type_name()
            ),
        )
        .with_operator("var")
        .with_path(call.operand_path(1)));
    }
    let hint = match name {
        LogicNode::String(field) if c.scope().is_none() => {
            c.schema().and_then(|schema| schema.lookup_type(field))
        }
        _ => None,
    };
    if let (Some(FieldType::Enum), LogicNode::String(field)) = (hint, name) {
        c.validate_enum(field, call, call.operand_path(1), default)?;
    }
    let fallback = literal::coerce_literal(default, hint, c.spec()).unwrap_or_default();
    Ok(format!("COALESCE({}, {})", reference, fallback))
}

fn field_reference(c: &Compiler<'_>, call: &Call<'_>, name: &str) -> Result<String, TranspileError> {
    if let Some(scope) = c.scope() {
        return element_reference(scope, call, name);
    }
    if name.is_empty() {
        return Err(call.invalid_argument(
            "an empty var refers to the current array element and is only valid inside \
             map, filter, reduce, all, some or none",
        ));
    }
    c.require_field(name, &call.path)?;
    Ok(name.to_string())
}

/// Inside an iteration `""` is the element and `"a.b"` a member of it.
/// Inside `reduce` only `current` and `accumulator` are bound.
fn element_reference(scope: &Scope, call: &Call<'_>, name: &str) -> Result<String, TranspileError> {
    let Some(accumulator) = scope.accumulator else {
        return Ok(match name {
            "" => scope.element.to_string(),
            member => format!("{}.{}", scope.element, member),
        });
    };

    let (head, rest) = match name.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (name, None),
    };
    let base = match head {
        "" | "current" => scope.element,
        "accumulator" => accumulator,
        _ => {
            return Err(call.invalid_argument(format!(
                "inside reduce, var must reference 'current' or 'accumulator', got '{}'",
                name
            )));
        }
    };
    Ok(match rest {
        Some(member) => format!("{}.{}", base, member),
        None => base.to_string(),
    })
}

fn positional_reference(
    c: &Compiler<'_>,
    call: &Call<'_>,
    index: &Number,
) -> Result<String, TranspileError> {
    let Some(index) = index.as_u64() else {
        return Err(call.invalid_argument(format!(
            "var index must be a non-negative integer, got {}",
            index
        )));
    };
    match c.scope() {
        Some(scope) => Ok(c.spec().array_index(scope.element, index)),
        None => Err(call.invalid_argument(
            "a numeric var indexes the current array element and is only valid inside \
             map, filter, reduce, all, some or none",
        )),
    }
}

/// Resolves literal field names to SQL references.
fn field_references(
    c: &Compiler<'_>,
    call: &Call<'_>,
    names: &[LogicNode],
    path_of: impl Fn(usize) -> String,
) -> Result<Vec<String>, TranspileError> {
    names
        .iter()
        .enumerate()
        .map(|(j, node)| match node {
            LogicNode::String(name) => match c.scope() {
                Some(scope) => element_reference(scope, call, name),
                None => {
                    c.require_field(name, &path_of(j))?;
                    Ok(name.clone())
                }
            },
            other => Err(TranspileError::invalid_arg_type(
                call.operator,
                format!("field names must be strings, got {}", other.type_name()),
            )
            .with_path(path_of(j))),
        })
        .collect()
}

/// `{"missing": ["a", "b"]}` is true when any listed field is null.
fn missing(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.operands();
    // {"missing": [["a", "b"]]} lists the fields in a nested array
    let fields = match operands {
        [LogicNode::Array(inner)] => {
            field_references(c, call, inner, |j| list_item_path(call, 0, j))?
        }
        _ => field_references(c, call, operands, |j| call.operand_path(j))?,
    };
    if fields.is_empty() {
        return Err(TranspileError::insufficient_args("missing", 1, 0).with_path(&call.path));
    }

    let checks: Vec<String> = fields.iter().map(|f| format!("{} IS NULL", f)).collect();
    Ok(super::join_terms(&checks, "OR"))
}

/// `{"missing_some": [min, ["a", "b", "c"]]}` is true when fewer than `min`
/// of the listed fields are present.
fn missing_some(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, Some(2))?;

    let minimum = match &operands[0] {
        LogicNode::Number(n) => n.as_i64().ok_or_else(|| {
            call.invalid_argument(format!(
                "missing_some minimum must be an integer, got {}",
                n
            ))
        })?,
        other => {
            return Err(call.invalid_arg_type(
                0,
                format!(
                    "missing_some minimum must be a number, got {}",
                    other.type_name()
                ),
            ));
        }
    };
    let LogicNode::Array(names) = &operands[1] else {
        return Err(call.invalid_arg_type(
            1,
            format!(
                "missing_some requires an array of field names, got {}",
                operands[1].type_name()
            ),
        ));
    };
    let fields = field_references(c, call, names, |j| list_item_path(call, 1, j))?;
    let total = fields.len() as i64;

    if minimum <= 0 {
        return Ok("FALSE".to_string());
    }
    if minimum > total {
        return Ok("TRUE".to_string());
    }

    let rendered = if minimum == total {
        let checks: Vec<String> = fields.iter().map(|f| format!("{} IS NULL", f)).collect();
        super::join_terms(&checks, "OR")
    } else if minimum == 1 {
        let checks: Vec<String> = fields.iter().map(|f| format!("{} IS NULL", f)).collect();
        super::join_terms(&checks, "AND")
    } else {
        let present: Vec<String> = fields
            .iter()
            .map(|f| format!("CASE WHEN {} IS NOT NULL THEN 1 ELSE 0 END", f))
            .collect();
        format!("({}) < {}", present.join(" + "), minimum)
    };
    Ok(rendered)
}
