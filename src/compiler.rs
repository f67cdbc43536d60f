use tracing::trace;

use crate::{
    ast::{
        BuiltinOperator, LogicNode, Operation,
        node::{operation_path, slot_path},
    },
    dialect::{Dialect, DialectSpec},
    error::{ErrorCode, ROOT_PATH, TranspileError, build_array_path},
    literal,
    operators,
    registry::{OperatorHandler, RegistrySnapshot},
    schema::{FieldType, OperatorCategory, Schema},
};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// SQL alias bound to the current array element inside comprehensions.
pub(crate) const ELEMENT: &str = "elem";
/// SQL alias bound to the accumulator inside `reduce`.
pub(crate) const ACCUMULATOR: &str = "acc";

/// Names introduced by an enclosing array operation.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub element: &'static str,
    /// Set inside `reduce`, where `current` and `accumulator` are bound.
    pub accumulator: Option<&'static str>,
}

impl Scope {
    pub fn element() -> Self {
        Scope {
            element: ELEMENT,
            accumulator: None,
        }
    }

    pub fn reduce() -> Self {
        Scope {
            element: ELEMENT,
            accumulator: Some(ACCUMULATOR),
        }
    }
}

/// One operator invocation being compiled.
#[derive(Debug)]
pub struct Call<'n> {
    pub operator: &'n str,
    pub args: &'n LogicNode,
    /// Location of the operator node, e.g. `$.and.in[1]`.
    pub path: String,
    pub depth: usize,
}

impl<'n> Call<'n> {
    /// All arguments: an array's elements, or the bare value alone.
    pub fn operands(&self) -> &'n [LogicNode] {
        match self.args {
            LogicNode::Array(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Arguments of an operator that only accepts an array.
    pub fn array_operands(&self) -> Result<&'n [LogicNode], TranspileError> {
        match self.args {
            LogicNode::Array(items) => Ok(items),
            _ => Err(TranspileError::requires_array(self.operator).with_path(&self.path)),
        }
    }

    /// Arguments, checked to number between `min` and `max` (inclusive).
    pub fn arity(&self, min: usize, max: Option<usize>) -> Result<&'n [LogicNode], TranspileError> {
        let operands = self.operands();
        self.check_count(operands.len(), min, max)?;
        Ok(operands)
    }

    /// Like [`arity`](Self::arity), but the arguments must be an array.
    pub fn array_arity(
        &self,
        min: usize,
        max: Option<usize>,
    ) -> Result<&'n [LogicNode], TranspileError> {
        let operands = self.array_operands()?;
        self.check_count(operands.len(), min, max)?;
        Ok(operands)
    }

    fn check_count(&self, n: usize, min: usize, max: Option<usize>) -> Result<(), TranspileError> {
        if n < min {
            return Err(TranspileError::insufficient_args(self.operator, min, n).with_path(&self.path));
        }
        if let Some(max) = max
            && n > max
        {
            return Err(TranspileError::too_many_args(self.operator, max, n).with_path(&self.path));
        }
        Ok(())
    }

    /// Position of argument `i` for path building: `None` for a bare value.
    pub fn operand_index(&self, i: usize) -> Option<usize> {
        match self.args {
            LogicNode::Array(_) => Some(i),
            _ => None,
        }
    }

    /// Location of argument `i`.
    pub fn operand_path(&self, i: usize) -> String {
        slot_path(&self.path, self.operand_index(i))
    }

    pub fn invalid_argument(&self, message: impl Into<String>) -> TranspileError {
        TranspileError::invalid_argument(self.operator, message).with_path(&self.path)
    }

    pub fn invalid_arg_type(&self, i: usize, message: impl Into<String>) -> TranspileError {
        TranspileError::invalid_arg_type(self.operator, message).with_path(self.operand_path(i))
    }
}

/// Recursive walker turning a [`LogicNode`] into SQL.
///
/// A compiler lives for a single compilation. It owns a snapshot of the
/// custom operator registry, so registrations made while it runs are not
/// observed.
pub struct Compiler<'a> {
    dialect: Dialect,
    schema: Option<&'a Schema>,
    custom: RegistrySnapshot,
    max_depth: usize,
    scopes: Vec<Scope>,
}

impl<'a> Compiler<'a> {
    pub fn new(
        dialect: Dialect,
        schema: Option<&'a Schema>,
        custom: RegistrySnapshot,
        max_depth: usize,
    ) -> Self {
        Compiler {
            dialect,
            schema,
            custom,
            max_depth,
            scopes: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn spec(&self) -> &'static DialectSpec {
        self.dialect.spec()
    }

    pub fn schema(&self) -> Option<&'a Schema> {
        self.schema
    }

    /// Compiles a whole expression. The root must be an operator object.
    pub fn compile(&mut self, node: &LogicNode) -> Result<String, TranspileError> {
        match node {
            LogicNode::Operation(op) => self.compile_operation(op, ROOT_PATH, None, 0),
            LogicNode::Array(_) => Err(TranspileError::new(
                ErrorCode::ArrayNotAllowed,
                "expression must be an operator object, not an array",
            )
            .with_path(ROOT_PATH)),
            other => Err(TranspileError::new(
                ErrorCode::PrimitiveNotAllowed,
                format!(
                    "expression must be an operator object, not a {}",
                    other.type_name()
                ),
            )
            .with_path(ROOT_PATH)),
        }
    }

    fn compile_operation(
        &mut self,
        op: &Operation,
        parent: &str,
        index: Option<usize>,
        depth: usize,
    ) -> Result<String, TranspileError> {
        let path = operation_path(parent, &op.operator, index);
        if depth > self.max_depth {
            return Err(TranspileError::new(
                ErrorCode::MaxDepthExceeded,
                format!(
                    "expression nesting exceeds the maximum depth of {}",
                    self.max_depth
                ),
            )
            .with_path(path));
        }

        let call = Call {
            operator: &op.operator,
            args: &op.args,
            path,
            depth,
        };

        let result = if let Some(handler) = self.custom.get(&op.operator).cloned() {
            trace!(operator = %op.operator, path = %call.path, "custom operator");
            self.compile_custom(&handler, &call)
        } else if let Some(builtin) = BuiltinOperator::from_name(&op.operator) {
            trace!(operator = %op.operator, path = %call.path, "built-in operator");
            operators::compile(self, builtin, &call)
        } else {
            Err(TranspileError::unsupported_operator(&op.operator))
        };

        result.map_err(|e| e.locate(&op.operator, &call.path))
    }

    fn compile_custom(
        &mut self,
        handler: &OperatorHandler,
        call: &Call<'_>,
    ) -> Result<String, TranspileError> {
        let args = call
            .operands()
            .iter()
            .enumerate()
            .map(|(i, node)| self.compile_operand(call, i, node))
            .collect::<Result<Vec<_>, _>>()?;

        handler
            .call(call.operator, &args, self.dialect)
            .map_err(|cause| {
                TranspileError::new(
                    ErrorCode::CustomOperatorFailed,
                    format!("custom operator '{}' failed", call.operator),
                )
                .with_operator(call.operator)
                .with_path(&call.path)
                .with_cause(cause)
            })
    }

    /// Compiles argument `i` of `call`.
    pub fn compile_operand(
        &mut self,
        call: &Call<'_>,
        i: usize,
        node: &LogicNode,
    ) -> Result<String, TranspileError> {
        self.compile_operand_as(call, i, node, None)
    }

    /// Compiles argument `i` of `call`, rendering literals for a field of
    /// type `hint`.
    pub fn compile_operand_as(
        &mut self,
        call: &Call<'_>,
        i: usize,
        node: &LogicNode,
        hint: Option<FieldType>,
    ) -> Result<String, TranspileError> {
        self.compile_value(node, &call.path, call.operand_index(i), call.depth + 1, hint)
    }

    fn compile_value(
        &mut self,
        node: &LogicNode,
        parent: &str,
        index: Option<usize>,
        depth: usize,
        hint: Option<FieldType>,
    ) -> Result<String, TranspileError> {
        match node {
            LogicNode::Operation(op) => self.compile_operation(op, parent, index, depth),
            LogicNode::Array(items) => {
                let path = slot_path(parent, index);
                let rendered = items
                    .iter()
                    .enumerate()
                    .map(|(j, item)| self.compile_value(item, &path, Some(j), depth + 1, hint))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.spec().array_literal(&rendered))
            }
            primitive => Ok(literal::coerce_literal(primitive, hint, self.spec()).unwrap_or_default()),
        }
    }

    /// Renders the elements of a literal array for an `IN (...)` list.
    pub fn compile_list_items(
        &mut self,
        call: &Call<'_>,
        i: usize,
        items: &[LogicNode],
        hint: Option<FieldType>,
    ) -> Result<Vec<String>, TranspileError> {
        let path = call.operand_path(i);
        items
            .iter()
            .enumerate()
            .map(|(j, item)| self.compile_value(item, &path, Some(j), call.depth + 2, hint))
            .collect()
    }

    // Scopes

    pub(crate) fn scope(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Runs `f` with `scope` bound.
    pub(crate) fn with_scope<T>(
        &mut self,
        scope: Scope,
        f: impl FnOnce(&mut Self) -> Result<T, TranspileError>,
    ) -> Result<T, TranspileError> {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    // Schema

    /// Schema field referenced by `node`, with its declared type.
    ///
    /// Only plain `var` references outside array iterations are schema
    /// fields; inside an iteration `var` names element members.
    pub fn field_of<'n>(&self, node: &'n LogicNode) -> Option<(&'n str, FieldType)> {
        if self.scope().is_some() {
            return None;
        }
        let schema = self.schema?;
        let name = node.var_name()?;
        schema.lookup_type(name).map(|t| (name, t))
    }

    /// Declared type of the first schema field among `nodes`.
    pub fn first_field_type(&self, nodes: &[LogicNode]) -> Option<FieldType> {
        nodes.iter().find_map(|n| self.field_of(n)).map(|(_, t)| t)
    }

    /// Type-gates `node` when it references a schema field.
    pub fn gate(
        &self,
        category: OperatorCategory,
        call: &Call<'_>,
        i: usize,
        node: &LogicNode,
    ) -> Result<(), TranspileError> {
        match (self.schema, self.field_of(node)) {
            (Some(schema), Some((name, _))) => schema
                .check_compatible(category, call.operator, name)
                .map_err(|e| e.with_path(call.operand_path(i))),
            _ => Ok(()),
        }
    }

    /// Type-gates every argument of `call`.
    pub fn gate_all(
        &self,
        category: OperatorCategory,
        call: &Call<'_>,
        nodes: &[LogicNode],
    ) -> Result<(), TranspileError> {
        nodes
            .iter()
            .enumerate()
            .try_for_each(|(i, node)| self.gate(category, call, i, node))
    }

    /// Checks a literal against an enum field. Null and non-literals pass.
    pub fn validate_enum(
        &self,
        field: &str,
        call: &Call<'_>,
        path: String,
        value: &LogicNode,
    ) -> Result<(), TranspileError> {
        match (self.schema, literal::literal_text(value)) {
            (Some(schema), Some(text)) => schema
                .validate_enum(field, &text)
                .map_err(|e| e.with_operator(call.operator).with_path(path)),
            _ => Ok(()),
        }
    }

    /// Existence check for a field name.
    pub fn require_field(&self, name: &str, path: &str) -> Result<(), TranspileError> {
        match self.schema {
            Some(schema) => schema.validate_field(name).map_err(|e| e.with_path(path)),
            None => Ok(()),
        }
    }
}

/// Path of element `j` inside literal array argument `i`.
pub(crate) fn list_item_path(call: &Call<'_>, i: usize, j: usize) -> String {
    build_array_path(&call.operand_path(i), j)
}
