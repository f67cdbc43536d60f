//! Structured errors and expression paths.
//!
//! Every failure surfaced by the crate is a [`TranspileError`]. Each error
//! carries a stable [`ErrorCode`] meant for programmatic branching, the
//! operator that raised it, and a JSONPath-like location such as
//! `$.and.unknown_op[0]`.

use std::{fmt, sync::Arc};

/// Boxed error type returned by custom operator handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Broad grouping of error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed expression shape or input document (E0xx)
    Structural,
    /// Operator resolution and invocation (E1xx)
    Operator,
    /// Schema and type checks (E2xx)
    TypeSchema,
    /// Operator arguments (E3xx)
    Argument,
}

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Structural
    /// The expression is not a valid JSON Logic expression
    InvalidExpression,
    /// An array that must not be empty was empty
    EmptyArray,
    /// An operator object had zero or more than one key
    MultipleKeys,
    /// A primitive appeared where an operator object was expected
    PrimitiveNotAllowed,
    /// An array appeared where an operator object was expected
    ArrayNotAllowed,
    /// General validation failure (schemas, configuration)
    Validation,
    /// The input could not be decoded as JSON
    InvalidJson,
    /// The expression nests deeper than the configured maximum
    MaxDepthExceeded,

    // Operator
    /// No built-in or custom operator with this name
    UnsupportedOperator,
    /// The operator needs an array of arguments
    OperatorRequiresArray,
    /// A custom operator handler returned an error
    CustomOperatorFailed,

    // Type / schema
    /// Operand types conflict with each other
    TypeMismatch,
    /// The referenced field is not declared in the schema
    FieldNotInSchema,
    /// The field's declared type cannot be used with the operator
    InvalidFieldType,
    /// The literal is not one of the enum field's allowed values
    InvalidEnumValue,

    // Argument
    /// Too few arguments
    InsufficientArgs,
    /// Too many arguments
    TooManyArgs,
    /// An argument has an invalid value
    InvalidArgument,
    /// An argument has an invalid JSON type
    InvalidArgType,
    /// The default value of a `var` is not a primitive
    InvalidDefaultValue,
}

impl ErrorCode {
    /// The stable code string, e.g. `"E100"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidExpression => "E001",
            ErrorCode::EmptyArray => "E002",
            ErrorCode::MultipleKeys => "E003",
            ErrorCode::PrimitiveNotAllowed => "E004",
            ErrorCode::ArrayNotAllowed => "E005",
            ErrorCode::Validation => "E006",
            ErrorCode::InvalidJson => "E007",
            ErrorCode::MaxDepthExceeded => "E008",
            ErrorCode::UnsupportedOperator => "E100",
            ErrorCode::OperatorRequiresArray => "E101",
            ErrorCode::CustomOperatorFailed => "E102",
            ErrorCode::TypeMismatch => "E200",
            ErrorCode::FieldNotInSchema => "E201",
            ErrorCode::InvalidFieldType => "E202",
            ErrorCode::InvalidEnumValue => "E203",
            ErrorCode::InsufficientArgs => "E300",
            ErrorCode::TooManyArgs => "E301",
            ErrorCode::InvalidArgument => "E302",
            ErrorCode::InvalidArgType => "E303",
            ErrorCode::InvalidDefaultValue => "E304",
        }
    }

    pub const fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::InvalidExpression
            | ErrorCode::EmptyArray
            | ErrorCode::MultipleKeys
            | ErrorCode::PrimitiveNotAllowed
            | ErrorCode::ArrayNotAllowed
            | ErrorCode::Validation
            | ErrorCode::InvalidJson
            | ErrorCode::MaxDepthExceeded => ErrorCategory::Structural,
            ErrorCode::UnsupportedOperator
            | ErrorCode::OperatorRequiresArray
            | ErrorCode::CustomOperatorFailed => ErrorCategory::Operator,
            ErrorCode::TypeMismatch
            | ErrorCode::FieldNotInSchema
            | ErrorCode::InvalidFieldType
            | ErrorCode::InvalidEnumValue => ErrorCategory::TypeSchema,
            ErrorCode::InsufficientArgs
            | ErrorCode::TooManyArgs
            | ErrorCode::InvalidArgument
            | ErrorCode::InvalidArgType
            | ErrorCode::InvalidDefaultValue => ErrorCategory::Argument,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error shape returned by the transpiler.
///
/// Errors are values: [`with_path`](Self::with_path) and
/// [`with_operator`](Self::with_operator) return annotated copies, so each
/// frame of the walker can attach its location without mutating a shared
/// instance.
#[derive(Debug, Clone)]
pub struct TranspileError {
    pub code: ErrorCode,
    pub operator: Option<String>,
    pub path: Option<String>,
    pub message: String,
    pub cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl TranspileError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        TranspileError {
            code,
            operator: None,
            path: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Returns a copy located at `path`.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        TranspileError {
            path: Some(path.into()),
            ..self.clone()
        }
    }

    /// Returns a copy attributed to `operator`.
    pub fn with_operator(&self, operator: impl Into<String>) -> Self {
        TranspileError {
            operator: Some(operator.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with `cause` attached.
    pub fn with_cause(self, cause: impl Into<BoxError>) -> Self {
        let cause: BoxError = cause.into();
        TranspileError {
            cause: Some(Arc::from(cause)),
            ..self
        }
    }

    /// Fills in the path and operator only where they are not already set.
    ///
    /// The innermost frame knows the most precise location, so enclosing
    /// frames never overwrite it.
    pub(crate) fn locate(self, operator: &str, path: &str) -> Self {
        TranspileError {
            operator: self.operator.or_else(|| Some(operator.to_string())),
            path: self.path.or_else(|| Some(path.to_string())),
            ..self
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    // Constructors for the common shapes.

    pub fn unsupported_operator(operator: &str) -> Self {
        TranspileError::new(
            ErrorCode::UnsupportedOperator,
            format!("unsupported operator '{}'", operator),
        )
        .with_operator(operator)
    }

    pub fn insufficient_args(operator: &str, required: usize, received: usize) -> Self {
        TranspileError::new(
            ErrorCode::InsufficientArgs,
            format!(
                "operator '{}' requires at least {} argument(s), got {}",
                operator, required, received
            ),
        )
        .with_operator(operator)
    }

    pub fn too_many_args(operator: &str, allowed: usize, received: usize) -> Self {
        TranspileError::new(
            ErrorCode::TooManyArgs,
            format!(
                "operator '{}' accepts at most {} argument(s), got {}",
                operator, allowed, received
            ),
        )
        .with_operator(operator)
    }

    pub fn requires_array(operator: &str) -> Self {
        TranspileError::new(
            ErrorCode::OperatorRequiresArray,
            format!("operator '{}' requires an array of arguments", operator),
        )
        .with_operator(operator)
    }

    pub fn invalid_argument(operator: &str, message: impl Into<String>) -> Self {
        TranspileError::new(ErrorCode::InvalidArgument, message).with_operator(operator)
    }

    pub fn invalid_arg_type(operator: &str, message: impl Into<String>) -> Self {
        TranspileError::new(ErrorCode::InvalidArgType, message).with_operator(operator)
    }
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for TranspileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for TranspileError {
    fn from(e: serde_json::Error) -> Self {
        TranspileError::new(ErrorCode::InvalidJson, "invalid JSON").with_cause(e)
    }
}

/// Root of every expression path.
pub const ROOT_PATH: &str = "$";

/// Appends an operator segment: `build_path("$", "and")` is `$.and`.
pub fn build_path(parent: &str, segment: &str) -> String {
    format!("{}.{}", parent, segment)
}

/// Appends an index segment: `build_array_path("$.and", 0)` is `$.and[0]`.
pub fn build_array_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}
