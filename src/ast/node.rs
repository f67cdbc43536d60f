use serde_json::{Number, Value};

use crate::error::{ErrorCode, ROOT_PATH, TranspileError, build_array_path, build_path};

/// A node of a JSON Logic expression.
///
/// Built from decoded JSON with [`LogicNode::from_json`], which rejects
/// objects that are not single-key operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicNode {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<LogicNode>),
    /// `{"<operator>": <args>}`
    Operation(Operation),
}

/// A single-key operator object.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    /// Usually an array; unary operators also accept a bare value.
    pub args: Box<LogicNode>,
}

impl LogicNode {
    /// `{"<operator>": <args>}`
    pub fn op(operator: impl Into<String>, args: LogicNode) -> Self {
        LogicNode::Operation(Operation {
            operator: operator.into(),
            args: Box::new(args),
        })
    }

    /// `{"var": "<name>"}`
    pub fn var(name: impl Into<String>) -> Self {
        LogicNode::op("var", LogicNode::String(name.into()))
    }

    /// Converts decoded JSON, validating structure along the way.
    ///
    /// Fails with `MultipleKeys` for objects without exactly one key and with
    /// `MaxDepthExceeded` when nesting exceeds `max_depth`.
    pub fn from_json(value: &Value, max_depth: usize) -> Result<Self, TranspileError> {
        convert(value, ROOT_PATH, None, 0, max_depth)
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            LogicNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        !matches!(self, LogicNode::Operation(_) | LogicNode::Array(_))
    }

    /// Field name when this node is `{"var": "name"}` or
    /// `{"var": ["name", default]}`.
    pub fn var_name(&self) -> Option<&str> {
        let op = self.as_operation()?;
        if op.operator != "var" {
            return None;
        }
        match op.args.as_ref() {
            LogicNode::String(name) => Some(name),
            LogicNode::Array(items) => match items.first() {
                Some(LogicNode::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Human-readable JSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            LogicNode::Null => "null",
            LogicNode::Bool(_) => "boolean",
            LogicNode::Number(_) => "number",
            LogicNode::String(_) => "string",
            LogicNode::Array(_) => "array",
            LogicNode::Operation(_) => "operation",
        }
    }

    /// Converts back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            LogicNode::Null => Value::Null,
            LogicNode::Bool(b) => Value::Bool(*b),
            LogicNode::Number(n) => Value::Number(n.clone()),
            LogicNode::String(s) => Value::String(s.clone()),
            LogicNode::Array(items) => Value::Array(items.iter().map(LogicNode::to_json).collect()),
            LogicNode::Operation(op) => {
                let mut map = serde_json::Map::new();
                map.insert(op.operator.clone(), op.args.to_json());
                Value::Object(map)
            }
        }
    }
}

impl Operation {
    /// Arguments as a list: an array's elements, or the bare value alone.
    pub fn operands(&self) -> &[LogicNode] {
        match self.args.as_ref() {
            LogicNode::Array(items) => items,
            other => std::slice::from_ref(other),
        }
    }
}

/// Location of a node that sits at `index` within its parent's arguments.
pub(crate) fn slot_path(parent: &str, index: Option<usize>) -> String {
    match index {
        Some(i) => build_array_path(parent, i),
        None => parent.to_string(),
    }
}

/// Path of an operator node: `<parent>.<op>`, then `[i]` when the node is
/// element `i` of its parent's argument array.
pub(crate) fn operation_path(parent: &str, operator: &str, index: Option<usize>) -> String {
    slot_path(&build_path(parent, operator), index)
}

fn convert(
    value: &Value,
    parent: &str,
    index: Option<usize>,
    depth: usize,
    max_depth: usize,
) -> Result<LogicNode, TranspileError> {
    if depth > max_depth {
        return Err(TranspileError::new(
            ErrorCode::MaxDepthExceeded,
            format!("expression nesting exceeds the maximum depth of {}", max_depth),
        )
        .with_path(slot_path(parent, index)));
    }

    match value {
        Value::Null => Ok(LogicNode::Null),
        Value::Bool(b) => Ok(LogicNode::Bool(*b)),
        Value::Number(n) => Ok(LogicNode::Number(n.clone())),
        Value::String(s) => Ok(LogicNode::String(s.clone())),
        Value::Array(items) => {
            let path = slot_path(parent, index);
            let nodes = items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &path, Some(i), depth + 1, max_depth))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(LogicNode::Array(nodes))
        }
        Value::Object(map) => {
            let mut entries = map.iter();
            let (operator, args) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => {
                    return Err(TranspileError::new(
                        ErrorCode::MultipleKeys,
                        format!(
                            "operator object must have exactly one key, found {}",
                            map.len()
                        ),
                    )
                    .with_path(slot_path(parent, index)));
                }
            };

            let path = operation_path(parent, operator, index);
            let args = match args {
                Value::Array(items) => LogicNode::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| convert(item, &path, Some(i), depth + 1, max_depth))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => convert(other, &path, None, depth + 1, max_depth)?,
            };
            Ok(LogicNode::op(operator.clone(), args))
        }
    }
}

impl TryFrom<&Value> for LogicNode {
    type Error = TranspileError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        LogicNode::from_json(value, crate::compiler::DEFAULT_MAX_DEPTH)
    }
}
