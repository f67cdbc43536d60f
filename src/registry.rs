//! Custom operator registry.
//!
//! Custom operators receive the operator name, their arguments already
//! compiled to SQL text, and the active [`Dialect`]. Because arguments are
//! compiled before the handler runs, custom and built-in operators nest
//! inside each other freely.
//!
//! Arguments are opaque SQL fragments. A handler that inspects them (for
//! example to recognize a quoted literal) relies on rendering details that
//! may change between dialects and versions.
//!
//! # Examples
//!
//! ```
//! use jsonlogic_sql::{Dialect, registry::OperatorRegistry};
//!
//! let registry = OperatorRegistry::new();
//! registry
//!     .register_fn("toLower", |_, args| Ok(format!("LOWER({})", args[0])))
//!     .unwrap();
//! assert!(registry.has("toLower"));
//! assert!(registry.register_fn("and", |_, _| Ok(String::new())).is_err());
//! ```

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use crate::{ast::is_builtin, dialect::Dialect, error::BoxError};

/// Result of a custom operator handler.
pub type HandlerResult = Result<String, BoxError>;

type HandlerFn = dyn Fn(&str, &[String], Dialect) -> HandlerResult + Send + Sync;

/// A custom operator implemented as an object.
pub trait CustomOperator: Send + Sync {
    fn to_sql(&self, operator: &str, args: &[String]) -> HandlerResult;
}

/// A custom operator whose rendering depends on the target dialect.
pub trait DialectAwareOperator: Send + Sync {
    fn to_sql(&self, operator: &str, args: &[String], dialect: Dialect) -> HandlerResult;
}

/// One handler shape for every kind of custom operator.
///
/// The dialect is always supplied; handlers registered without dialect
/// awareness ignore it.
#[derive(Clone)]
pub struct OperatorHandler {
    func: Arc<HandlerFn>,
    dialect_aware: bool,
}

impl OperatorHandler {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        OperatorHandler {
            func: Arc::new(move |op: &str, args: &[String], _: Dialect| f(op, args)),
            dialect_aware: false,
        }
    }

    pub fn dialect_aware_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &[String], Dialect) -> HandlerResult + Send + Sync + 'static,
    {
        OperatorHandler {
            func: Arc::new(f),
            dialect_aware: true,
        }
    }

    pub fn from_operator<O: CustomOperator + 'static>(operator: O) -> Self {
        Self::from_fn(move |op, args| operator.to_sql(op, args))
    }

    pub fn from_dialect_aware<O: DialectAwareOperator + 'static>(operator: O) -> Self {
        Self::dialect_aware_fn(move |op, args, dialect| operator.to_sql(op, args, dialect))
    }

    pub fn is_dialect_aware(&self) -> bool {
        self.dialect_aware
    }

    pub fn call(&self, operator: &str, args: &[String], dialect: Dialect) -> HandlerResult {
        (self.func)(operator, args, dialect)
    }
}

impl fmt::Debug for OperatorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorHandler")
            .field("dialect_aware", &self.dialect_aware)
            .finish_non_exhaustive()
    }
}

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("operator '{0}' conflicts with a built-in operator")]
    BuiltinConflict(String),

    #[error("operator name must not be empty")]
    EmptyName,
}

/// Immutable view of the registry taken at one point in time.
pub type RegistrySnapshot = Arc<HashMap<String, OperatorHandler>>;

/// Thread-safe name → handler map.
///
/// Writers copy the map and swap it in; readers take a snapshot. A
/// compilation holds one snapshot for its whole run, so concurrent
/// registration never changes operators underneath it.
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    operators: RwLock<RegistrySnapshot>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, handler: OperatorHandler) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if is_builtin(name) {
            return Err(RegistryError::BuiltinConflict(name.to_string()));
        }
        let dialect_aware = handler.is_dialect_aware();
        self.update(|ops| {
            ops.insert(name.to_string(), handler);
        });
        debug!(operator = name, dialect_aware, "registered custom operator");
        Ok(())
    }

    pub fn register_fn<F>(&self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: Fn(&str, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(name, OperatorHandler::from_fn(f))
    }

    pub fn register_dialect_aware_fn<F>(&self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: Fn(&str, &[String], Dialect) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(name, OperatorHandler::dialect_aware_fn(f))
    }

    /// Returns whether an operator was removed.
    pub fn unregister(&self, name: &str) -> bool {
        if !self.has(name) {
            return false;
        }
        let mut removed = false;
        self.update(|ops| removed = ops.remove(name).is_some());
        if removed {
            debug!(operator = name, "unregistered custom operator");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<OperatorHandler> {
        self.operators.read().get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.operators.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        let mut names: Vec<String> = snapshot.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.operators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.read().is_empty()
    }

    pub fn clear(&self) {
        *self.operators.write() = Arc::default();
        debug!("cleared custom operators");
    }

    /// Copies every operator of `other` into this registry, replacing
    /// operators with the same name.
    pub fn merge(&self, other: &OperatorRegistry) {
        let incoming = other.snapshot();
        self.update(|ops| {
            for (name, handler) in incoming.iter() {
                ops.insert(name.clone(), handler.clone());
            }
        });
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        Arc::clone(&self.operators.read())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, OperatorHandler>)) {
        let mut guard = self.operators.write();
        let mut next = HashMap::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }
}

impl Clone for OperatorRegistry {
    /// An independent registry holding the same operators.
    fn clone(&self) -> Self {
        OperatorRegistry {
            operators: RwLock::new(self.snapshot()),
        }
    }
}
