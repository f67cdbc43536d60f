//! The configured compiler: dialect, optional schema and custom operators.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    ast::LogicNode,
    compiler::{Compiler, DEFAULT_MAX_DEPTH},
    dialect::Dialect,
    error::{ErrorCode, TranspileError},
    registry::{
        CustomOperator, DialectAwareOperator, HandlerResult, OperatorHandler, OperatorRegistry,
        RegistryError,
    },
    schema::Schema,
};

/// Prefix added by the `transpile*` entry points.
pub const WHERE_PREFIX: &str = "WHERE ";

/// Compiles JSON Logic expressions into SQL for one dialect.
///
/// A `Transpiler` is `Send + Sync`. Custom operators can be registered
/// through a shared reference while other threads compile; each compilation
/// sees the registry as it was when that compilation started.
///
/// # Examples
///
/// ```
/// use jsonlogic_sql::{Dialect, Transpiler};
///
/// let transpiler = Transpiler::new(Dialect::BigQuery);
/// let sql = transpiler.transpile(r#"{">": [{"var": "amount"}, 1000]}"#).unwrap();
/// assert_eq!(sql, "WHERE amount > 1000");
/// ```
#[derive(Debug, Clone)]
pub struct Transpiler {
    dialect: Dialect,
    schema: Option<Arc<Schema>>,
    registry: OperatorRegistry,
    max_depth: usize,
}

impl Transpiler {
    pub fn new(dialect: Dialect) -> Self {
        Transpiler {
            dialect,
            schema: None,
            registry: OperatorRegistry::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Enables type gating, literal coercion and enum validation.
    pub fn with_schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Bounds expression nesting; deeper input fails with `MaxDepthExceeded`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_schema(&mut self, schema: impl Into<Arc<Schema>>) {
        self.schema = Some(schema.into());
    }

    pub fn clear_schema(&mut self) {
        self.schema = None;
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // ========================================================================
    // Custom operators
    // ========================================================================

    pub fn register_operator<O>(&self, name: &str, operator: O) -> Result<(), RegistryError>
    where
        O: CustomOperator + 'static,
    {
        self.registry.register(name, OperatorHandler::from_operator(operator))
    }

    pub fn register_operator_fn<F>(&self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: Fn(&str, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_fn(name, f)
    }

    pub fn register_dialect_aware_operator<O>(
        &self,
        name: &str,
        operator: O,
    ) -> Result<(), RegistryError>
    where
        O: DialectAwareOperator + 'static,
    {
        self.registry
            .register(name, OperatorHandler::from_dialect_aware(operator))
    }

    pub fn register_dialect_aware_operator_fn<F>(
        &self,
        name: &str,
        f: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&str, &[String], Dialect) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_dialect_aware_fn(name, f)
    }

    /// Returns whether an operator was removed.
    pub fn unregister_operator(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    pub fn has_custom_operator(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    /// Registered custom operator names, sorted.
    pub fn list_custom_operators(&self) -> Vec<String> {
        self.registry.list()
    }

    pub fn clear_custom_operators(&self) {
        self.registry.clear()
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    // ========================================================================
    // Compilation
    // ========================================================================

    /// Compiles JSON text into `WHERE <condition>`.
    pub fn transpile(&self, json: &str) -> Result<String, TranspileError> {
        Ok(format!("{}{}", WHERE_PREFIX, self.transpile_condition(json)?))
    }

    /// Compiles JSON text into a bare condition.
    pub fn transpile_condition(&self, json: &str) -> Result<String, TranspileError> {
        let value = self.decode(json)?;
        self.transpile_condition_value(&value)
    }

    /// Decodes JSON text. serde_json's fixed nesting limit is replaced by
    /// this transpiler's `max_depth`, checked on the raw text first.
    fn decode(&self, json: &str) -> Result<Value, TranspileError> {
        // An operator level is at most two brackets deep: `{"op": [`
        let bracket_limit = self.max_depth.saturating_add(1).saturating_mul(2);
        if bracket_depth_exceeds(json, bracket_limit) {
            return Err(TranspileError::new(
                ErrorCode::MaxDepthExceeded,
                format!(
                    "expression nesting exceeds the maximum depth of {}",
                    self.max_depth
                ),
            ));
        }

        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let value = Value::deserialize(&mut de)?;
        de.end()?;
        Ok(value)
    }

    /// Compiles decoded JSON into `WHERE <condition>`.
    pub fn transpile_value(&self, value: &Value) -> Result<String, TranspileError> {
        Ok(format!(
            "{}{}",
            WHERE_PREFIX,
            self.transpile_condition_value(value)?
        ))
    }

    /// Compiles decoded JSON into a bare condition.
    pub fn transpile_condition_value(&self, value: &Value) -> Result<String, TranspileError> {
        let node = LogicNode::from_json(value, self.max_depth)?;
        self.compile_node(&node)
    }

    /// Compiles an already-built tree into a bare condition.
    pub fn compile_node(&self, node: &LogicNode) -> Result<String, TranspileError> {
        let mut compiler = Compiler::new(
            self.dialect,
            self.schema.as_deref(),
            self.registry.snapshot(),
            self.max_depth,
        );
        match compiler.compile(node) {
            Ok(sql) => {
                debug!(dialect = %self.dialect, sql = %sql, "compiled expression");
                Ok(sql)
            }
            Err(e) => {
                debug!(dialect = %self.dialect, code = %e.code, error = %e, "compilation failed");
                Err(e)
            }
        }
    }
}

/// Whether brackets in `json` nest deeper than `limit`, ignoring brackets
/// inside string literals.
fn bracket_depth_exceeds(json: &str, limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for b in json.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}
