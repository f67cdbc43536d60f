//! Array operators: `in`, `map`, `filter`, `reduce`, `all`, `some`, `none`
//! and `merge`.
//!
//! Iterations bind the current element to `elem` (and the accumulator to
//! `acc` inside `reduce`). Dialects with higher-order array functions get
//! lambdas; the others get `UNNEST` subqueries.

use crate::{
    ast::{BuiltinOperator, LogicNode, node::operation_path},
    compiler::{ACCUMULATOR, Call, Compiler, ELEMENT, Scope, list_item_path},
    dialect::{Comprehension, DialectSpec, Quantifier},
    error::{ErrorCode, TranspileError},
    schema::{FieldType, OperatorCategory},
};

pub(super) fn compile(
    c: &mut Compiler<'_>,
    op: BuiltinOperator,
    call: &Call<'_>,
) -> Result<String, TranspileError> {
    match op {
        BuiltinOperator::In => membership(c, call),
        BuiltinOperator::Map => comprehension(c, call, Shape::Map),
        BuiltinOperator::Filter => comprehension(c, call, Shape::Filter),
        BuiltinOperator::Reduce => reduce(c, call),
        BuiltinOperator::All => quantifier(c, call, Quantity::All),
        BuiltinOperator::Some => quantifier(c, call, Quantity::Some),
        BuiltinOperator::None => quantifier(c, call, Quantity::None),
        BuiltinOperator::Merge => merge(c, call),
        _ => Err(TranspileError::unsupported_operator(call.operator)),
    }
}

/// What `in` tests for.
enum Membership {
    /// Element of an array
    Element,
    /// Substring of a string
    Substring,
}

/// `{"in": [needle, haystack]}`.
///
/// A literal array renders `IN (...)`. Otherwise the haystack's schema type,
/// or its shape when there is no schema, picks array membership or substring
/// containment.
fn membership(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, Some(2))?;
    let (needle, haystack) = (&operands[0], &operands[1]);

    if let LogicNode::Array(items) = haystack {
        if items.is_empty() {
            return Ok("FALSE".to_string());
        }
        let needle_field = c.field_of(needle);
        if let Some((name, FieldType::Enum)) = needle_field {
            for (j, item) in items.iter().enumerate() {
                c.validate_enum(name, call, list_item_path(call, 1, j), item)?;
            }
        }
        let value = c.compile_operand(call, 0, needle)?;
        let list = c.compile_list_items(call, 1, items, needle_field.map(|(_, t)| t))?;
        return Ok(format!("{} IN ({})", value, list.join(", ")));
    }

    let kind = match (haystack, c.field_of(haystack)) {
        (LogicNode::String(_), _) => Membership::Substring,
        (_, Some((_, FieldType::Array))) => Membership::Element,
        (_, Some((_, FieldType::String | FieldType::Enum))) => Membership::Substring,
        (_, Some((name, field_type))) => {
            return Err(TranspileError::new(
                ErrorCode::InvalidFieldType,
                format!(
                    "field '{}' of type {} cannot be searched by 'in'; expected array or string",
                    name, field_type
                ),
            )
            .with_operator(call.operator)
            .with_path(call.operand_path(1)));
        }
        (LogicNode::Operation(op), None) if matches!(op.operator.as_str(), "cat" | "substr") => {
            Membership::Substring
        }
        (_, None) => Membership::Element,
    };

    let value = c.compile_operand(call, 0, needle)?;
    let target = c.compile_operand(call, 1, haystack)?;
    Ok(match kind {
        Membership::Element => c.spec().array_contains(&target, &value),
        Membership::Substring => c.spec().contains(&target, &value),
    })
}

/// Compiles the array argument of an iteration, gating schema fields.
fn iterated_array(c: &mut Compiler<'_>, call: &Call<'_>, node: &LogicNode) -> Result<String, TranspileError> {
    c.gate(OperatorCategory::Array, call, 0, node)?;
    c.compile_operand(call, 0, node)
}

#[derive(Clone, Copy)]
enum Shape {
    Map,
    Filter,
}

/// `{"map": [array, expr]}` and `{"filter": [array, condition]}`.
fn comprehension(c: &mut Compiler<'_>, call: &Call<'_>, shape: Shape) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, Some(2))?;
    let array = iterated_array(c, call, &operands[0])?;
    let body = c.with_scope(Scope::element(), |c| c.compile_operand(call, 1, &operands[1]))?;

    let spec = c.spec();
    Ok(match (spec.comprehension, shape) {
        (Comprehension::Subquery(alias), Shape::Map) => format!(
            "ARRAY(SELECT {} FROM {})",
            body,
            DialectSpec::unnest(alias, &array, ELEMENT)
        ),
        (Comprehension::Subquery(alias), Shape::Filter) => format!(
            "ARRAY(SELECT {} FROM {} WHERE {})",
            ELEMENT,
            DialectSpec::unnest(alias, &array, ELEMENT),
            body
        ),
        (Comprehension::Lambda(functions), Shape::Map) => {
            functions.call(functions.map, &array, &lambda(&body), None)
        }
        (Comprehension::Lambda(functions), Shape::Filter) => {
            functions.call(functions.filter, &array, &lambda(&body), None)
        }
    })
}

fn lambda(body: &str) -> String {
    format!("{} -> {}", ELEMENT, body)
}

/// `{"reduce": [array, reducer, initial]}`.
///
/// Lambda dialects fold with the full reducer. Subquery dialects aggregate
/// over the unnested array, which supports reducers that combine the
/// accumulator with a per-element value through `+`, `max` or `min`.
fn reduce(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.array_arity(3, Some(3))?;
    let array = iterated_array(c, call, &operands[0])?;
    let initial = c.compile_operand(call, 2, &operands[2])?;

    match c.spec().comprehension {
        Comprehension::Lambda(functions) => {
            let body = c.with_scope(Scope::reduce(), |c| c.compile_operand(call, 1, &operands[1]))?;
            let reducer = format!("({}, {}) -> {}", ACCUMULATOR, ELEMENT, body);
            Ok(functions.call(functions.fold, &array, &reducer, Some(&initial)))
        }
        Comprehension::Subquery(alias) => {
            let (aggregate, value) = aggregate_reducer(c, call, &operands[1])?;
            let source = DialectSpec::unnest(alias, &array, ELEMENT);
            Ok(match aggregate {
                Aggregate::Sum => format!(
                    "(SELECT {} + COALESCE(SUM({}), 0) FROM {})",
                    initial, value, source
                ),
                Aggregate::Max => format!(
                    "(SELECT GREATEST({}, COALESCE(MAX({}), {})) FROM {})",
                    initial, value, initial, source
                ),
                Aggregate::Min => format!(
                    "(SELECT LEAST({}, COALESCE(MIN({}), {})) FROM {})",
                    initial, value, initial, source
                ),
            })
        }
    }
}

enum Aggregate {
    Sum,
    Max,
    Min,
}

/// Splits `{"+": [{"var": "accumulator"}, expr]}` into `SUM` and the
/// compiled per-element `expr`.
fn aggregate_reducer(
    c: &mut Compiler<'_>,
    call: &Call<'_>,
    reducer: &LogicNode,
) -> Result<(Aggregate, String), TranspileError> {
    let dialect = c.dialect();
    let unsupported = || {
        call.invalid_argument(format!(
            "reduce on {} supports reducers of the form \
             {{\"+\"|\"max\"|\"min\": [{{\"var\": \"accumulator\"}}, <expr>]}}",
            dialect
        ))
    };

    let Some(op) = reducer.as_operation() else {
        return Err(unsupported());
    };
    let aggregate = match op.operator.as_str() {
        "+" => Aggregate::Sum,
        "max" => Aggregate::Max,
        "min" => Aggregate::Min,
        _ => return Err(unsupported()),
    };
    let LogicNode::Array(terms) = op.args.as_ref() else {
        return Err(unsupported());
    };
    let value_index = match terms.as_slice() {
        [a, b] if is_accumulator(a) && !mentions_accumulator(b) => 1,
        [a, b] if is_accumulator(b) && !mentions_accumulator(a) => 0,
        _ => return Err(unsupported()),
    };

    let reducer_call = Call {
        operator: &op.operator,
        args: &op.args,
        path: operation_path(&call.path, &op.operator, call.operand_index(1)),
        depth: call.depth + 1,
    };
    let value = c.with_scope(Scope::reduce(), |c| {
        c.compile_operand_as(&reducer_call, value_index, &terms[value_index], Some(FieldType::Number))
    })?;
    Ok((aggregate, value))
}

fn is_accumulator(node: &LogicNode) -> bool {
    node.var_name() == Some("accumulator")
}

fn mentions_accumulator(node: &LogicNode) -> bool {
    match node {
        LogicNode::Operation(op) => {
            node.var_name()
                .is_some_and(|name| name == "accumulator" || name.starts_with("accumulator."))
                || mentions_accumulator(&op.args)
        }
        LogicNode::Array(items) => items.iter().any(mentions_accumulator),
        _ => false,
    }
}

#[derive(Clone, Copy)]
enum Quantity {
    All,
    Some,
    None,
}

/// `all`, `some` and `none` over `[array, condition]`.
fn quantifier(c: &mut Compiler<'_>, call: &Call<'_>, quantity: Quantity) -> Result<String, TranspileError> {
    let operands = call.array_arity(2, Some(2))?;
    let array = iterated_array(c, call, &operands[0])?;
    let condition = c.with_scope(Scope::element(), |c| c.compile_operand(call, 1, &operands[1]))?;

    Ok(match c.spec().quantifier {
        Quantifier::Exists(alias) => {
            let source = DialectSpec::unnest(alias, &array, ELEMENT);
            match quantity {
                Quantity::All => format!(
                    "NOT EXISTS (SELECT 1 FROM {} WHERE NOT ({}))",
                    source, condition
                ),
                Quantity::Some => format!("EXISTS (SELECT 1 FROM {} WHERE {})", source, condition),
                Quantity::None => {
                    format!("NOT EXISTS (SELECT 1 FROM {} WHERE {})", source, condition)
                }
            }
        }
        Quantifier::Lambda { all, exists } => match quantity {
            Quantity::All => format!("{}({}, {})", all, lambda(&condition), array),
            Quantity::Some => format!("{}({}, {})", exists, lambda(&condition), array),
            Quantity::None => format!("NOT {}({}, {})", exists, lambda(&condition), array),
        },
    })
}

/// `{"merge": [a, b, ...]}` flattens one level. All-literal arguments fold
/// into a single array literal; otherwise arrays are concatenated.
fn merge(c: &mut Compiler<'_>, call: &Call<'_>) -> Result<String, TranspileError> {
    let operands = call.operands();

    if operands.iter().all(|node| !matches!(node, LogicNode::Operation(_))) {
        let mut items = Vec::new();
        for (i, node) in operands.iter().enumerate() {
            match node {
                LogicNode::Array(inner) => items.extend(c.compile_list_items(call, i, inner, None)?),
                scalar => items.push(c.compile_operand(call, i, scalar)?),
            }
        }
        return Ok(c.spec().array_literal(&items));
    }

    let mut parts = Vec::with_capacity(operands.len());
    for (i, node) in operands.iter().enumerate() {
        let part = match node {
            LogicNode::Operation(_) => {
                c.gate(OperatorCategory::Array, call, i, node)?;
                c.compile_operand(call, i, node)?
            }
            LogicNode::Array(_) => c.compile_operand(call, i, node)?,
            scalar => {
                let value = c.compile_operand(call, i, scalar)?;
                c.spec().array_literal(&[value])
            }
        };
        parts.push(part);
    }
    Ok(match parts.as_slice() {
        [single] => single.clone(),
        _ => c.spec().array_concat(&parts),
    })
}
