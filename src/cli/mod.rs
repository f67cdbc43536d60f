//! CLI support for jsonlogic-sql
//!
//! Provides programmatic access to the `jsonlogic2sql` commands so other
//! tools can embed them.

mod dialects;
mod docs;
mod transpile;

pub use dialects::get_dialects_overview;
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use transpile::{TranspileOptions, execute_transpile};

use std::io;

use crate::{TranspileError, UnknownDialect};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Compilation error
    Transpile(TranspileError),
    /// Unrecognized `--dialect`
    Dialect(UnknownDialect),
    /// IO error, e.g. reading the schema file
    Io(io::Error),
    /// No expression given and nothing piped to stdin
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Transpile(e) => write!(f, "Transpile error: {}", e),
            CliError::Dialect(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(
                f,
                "No expression provided. Pass it as an argument or pipe JSON to stdin."
            ),
            CliError::UnknownCategory(c) => write!(
                f,
                "Unknown category: '{}'\nRun 'jsonlogic2sql docs' to see available categories.",
                c
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Transpile(e) => Some(e),
            CliError::Dialect(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TranspileError> for CliError {
    fn from(e: TranspileError) -> Self {
        CliError::Transpile(e)
    }
}

impl From<UnknownDialect> for CliError {
    fn from(e: UnknownDialect) -> Self {
        CliError::Dialect(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
