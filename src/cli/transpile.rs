//! Compile an expression given on the command line

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::CliError;
use crate::{Dialect, Schema, Transpiler};

/// Options for the transpile command
#[derive(Debug, Clone)]
pub struct TranspileOptions {
    /// The JSON Logic expression
    pub expression: Option<String>,
    /// Target dialect name
    pub dialect: String,
    /// Schema document to load
    pub schema: Option<PathBuf>,
    /// Omit the `WHERE ` prefix
    pub condition: bool,
    /// Maximum nesting depth, when overriding the default
    pub max_depth: Option<usize>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        TranspileOptions {
            expression: None,
            dialect: Dialect::BigQuery.name().to_string(),
            schema: None,
            condition: false,
            max_depth: None,
        }
    }
}

/// Build a transpiler from the options and compile the expression
pub fn execute_transpile(options: &TranspileOptions) -> Result<String, CliError> {
    let expression = options
        .expression
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(CliError::NoInput)?;

    let dialect: Dialect = options.dialect.parse()?;
    let mut transpiler = Transpiler::new(dialect);
    if let Some(max_depth) = options.max_depth {
        transpiler = transpiler.with_max_depth(max_depth);
    }
    if let Some(path) = &options.schema {
        let document = fs::read_to_string(path)?;
        let schema = Schema::from_json(&document)?;
        debug!(path = %path.display(), fields = schema.len(), "loaded schema");
        transpiler.set_schema(schema);
    }

    let sql = if options.condition {
        transpiler.transpile_condition(expression)?
    } else {
        transpiler.transpile(expression)?
    };
    Ok(sql)
}
