//! The chainable field accumulator.
//!
//! Responsibilities:
//! - Store declared fields in declaration order behind a single lock.
//! - Implement the chain operations: `add`, `alias`, `inherit`, `group`,
//!   `remove`, `render` and `fork` (the chain's `clone` operation).
//! - Evaluate fields lazily on every read, with overrides taking precedence.
//!
//! Does NOT handle:
//! - Reading `.env` files (see `env::loader`).
//!
//! Invariants / Assumptions:
//! - Operation names in `RESERVED_NAMES` never name a field.
//! - Dependencies are read-time: inherited and derived fields see the
//!   current value of the fields they reference.
//! - The store lock is never held while caller code runs (derivations,
//!   group builders), so derivations can read sibling fields.
//! - Redeclaring a name keeps its original position; removing and
//!   re-adding it appends it at the end.
//! - `inherit` and `group` validate before mutating; a failed call leaves
//!   the chain unchanged.

mod context;
mod field;
mod value;

#[cfg(test)]
mod tests;

pub use context::Context;
pub use field::{Derivation, FieldKind, InheritOptions, ValueSource, derive};
pub use value::{FieldValue, Snapshot};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde_json::Value;

use crate::env::{EnvLoader, EnvSource, LoadOptions};
use crate::error::EnvChainError;
use field::Field;

/// Names of the chain operations. They can never be used as field names.
pub const RESERVED_NAMES: [&str; 7] = [
    "add", "alias", "inherit", "group", "remove", "render", "clone",
];

/// Returns true if `name` belongs to a chain operation.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// A growing and shrinking set of configuration fields.
///
/// `EnvChain` is a handle: cloning it with [`Clone`] yields another handle to
/// the same fields. Use [`EnvChain::fork`] for an independent copy.
///
/// Operations take `&self` and return the same handle, so they chain:
///
/// ```
/// use envchain::{EnvChain, InheritOptions, MapEnv};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), envchain::EnvChainError> {
/// let chain = EnvChain::with_source(Arc::new(MapEnv::new().with_var("HOST", "db.local")));
/// chain
///     .add("HOST", "localhost")
///     .inherit("REPLICA_HOST", "HOST", InheritOptions::default())?
///     .remove("UNUSED");
///
/// assert_eq!(chain.get_str("REPLICA_HOST")?.as_deref(), Some("db.local"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EnvChain {
    shared: Arc<Shared>,
}

struct Shared {
    loader: EnvLoader,
    env: Arc<dyn EnvSource>,
    fields: Mutex<IndexMap<String, Field>>,
}

impl EnvChain {
    /// Load the environment described by `options` and start an empty chain.
    pub fn new(options: LoadOptions) -> Result<Self, EnvChainError> {
        Self::from_loader(EnvLoader::new(options))
    }

    /// Run `loader` and start an empty chain over its result.
    pub fn from_loader(loader: EnvLoader) -> Result<Self, EnvChainError> {
        let env = loader.load()?;
        Ok(Self::assemble(loader, env))
    }

    /// Start an empty chain over an already populated source.
    pub fn with_source(source: Arc<dyn EnvSource>) -> Self {
        Self::assemble(EnvLoader::from_source(Arc::clone(&source)), source)
    }

    fn assemble(loader: EnvLoader, env: Arc<dyn EnvSource>) -> Self {
        Self {
            shared: Arc::new(Shared {
                loader,
                env,
                fields: Mutex::new(IndexMap::new()),
            }),
        }
    }

    fn fields(&self) -> MutexGuard<'_, IndexMap<String, Field>> {
        self.shared
            .fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Declare `name`, read from the environment under the same name.
    ///
    /// `default` is used when the variable is unset; a derivation replaces
    /// the environment value entirely. Redeclaring a name replaces the
    /// previous field. Reserved names are ignored.
    pub fn add(&self, name: impl Into<String>, default: impl Into<ValueSource>) -> &Self {
        let name = name.into();
        let lookup = name.clone();
        self.declare(name, lookup, false, default.into())
    }

    /// Declare `name`, read from the environment variable `env_name`.
    pub fn alias(
        &self,
        name: impl Into<String>,
        env_name: impl Into<String>,
        default: impl Into<ValueSource>,
    ) -> &Self {
        self.declare(name.into(), env_name.into(), true, default.into())
    }

    fn declare(&self, name: String, lookup: String, aliased: bool, default: ValueSource) -> &Self {
        if is_reserved(&name) {
            tracing::warn!(field = %name, "ignoring declaration of a reserved name");
            return self;
        }
        let field = Field::env(lookup, aliased, default);
        if self.fields().insert(name.clone(), field).is_some() {
            tracing::debug!(field = %name, "redeclared field");
        }
        self
    }

    /// Declare `name` as a live copy of the field `from`.
    ///
    /// # Errors
    ///
    /// - `ReservedName` if `name` belongs to a chain operation.
    /// - `DuplicateField` if `name` is already declared.
    /// - `UnknownSourceField` if `from` is not declared.
    pub fn inherit(
        &self,
        name: impl Into<String>,
        from: impl Into<String>,
        options: InheritOptions,
    ) -> Result<&Self, EnvChainError> {
        let name = name.into();
        let from = from.into();
        if is_reserved(&name) {
            return Err(EnvChainError::ReservedName(name));
        }

        let mut fields = self.fields();
        if fields.contains_key(&name) {
            return Err(EnvChainError::DuplicateField(name));
        }
        if !fields.contains_key(&from) {
            return Err(EnvChainError::UnknownSourceField { name, from });
        }
        fields.insert(name, Field::Inherited { from, options });
        Ok(self)
    }

    /// Declare `name` as a nested chain built by `build`.
    ///
    /// `build` receives a fresh chain loaded the same way as this one and
    /// returns the chain to store. Fields of the nested chain are independent
    /// of this chain's fields.
    ///
    /// # Errors
    ///
    /// - `ReservedName` if `name` belongs to a chain operation.
    /// - Any load error from creating the nested chain.
    /// - Any error returned by `build`.
    pub fn group<F>(&self, name: impl Into<String>, build: F) -> Result<&Self, EnvChainError>
    where
        F: FnOnce(EnvChain) -> Result<EnvChain, EnvChainError>,
    {
        let name = name.into();
        if is_reserved(&name) {
            return Err(EnvChainError::ReservedName(name));
        }

        let nested = build(self.spawn()?)?;
        if self.fields().insert(name.clone(), Field::Grouped(nested)).is_some() {
            tracing::debug!(field = %name, "redeclared group");
        }
        Ok(self)
    }

    /// Delete `name`. Absent names are ignored; dependents are left in place.
    pub fn remove(&self, name: &str) -> &Self {
        self.fields().shift_remove(name);
        self
    }

    /// Evaluate every field into a plain snapshot.
    ///
    /// Grouped fields are rendered recursively into nested objects, and unset
    /// fields appear as `null`.
    ///
    /// # Errors
    ///
    /// Any error from reading a field, including `CircularReference` when a
    /// group contains its own chain.
    pub fn render(&self) -> Result<Snapshot, EnvChainError> {
        self.render_in(&Context::new(self))
    }

    fn render_in(&self, ctx: &Context<'_>) -> Result<Snapshot, EnvChainError> {
        let mut snapshot = Snapshot::new();
        for name in self.names() {
            let value = self.resolve_value(&name, ctx)?.unwrap_or(Value::Null);
            snapshot.insert(name, value);
        }
        Ok(snapshot)
    }

    /// Independent copy of this chain (the chain's `clone` operation).
    ///
    /// The copy re-runs the load step and starts with the current fields,
    /// overrides included. Later declarations on either chain do not affect
    /// the other. Grouped fields keep sharing their nested chain.
    pub fn fork(&self) -> Result<EnvChain, EnvChainError> {
        let forked = self.spawn()?;
        let fields = self.fields().clone();
        *forked.fields() = fields;
        Ok(forked)
    }

    fn spawn(&self) -> Result<EnvChain, EnvChainError> {
        EnvChain::from_loader(self.shared.loader.clone())
    }

    /// Current value of `name`, or `None` when it is undeclared or unset.
    ///
    /// # Errors
    ///
    /// - `MissingInheritedValue` when a strict inherited field lost its source.
    /// - `CircularReference` when evaluation loops back to a field.
    /// - `Derivation` when a derivation closure fails.
    pub fn get(&self, name: &str) -> Result<Option<FieldValue>, EnvChainError> {
        let ctx = Context::new(self);
        self.resolve(name, &ctx)
    }

    /// String form of a scalar field value.
    pub fn get_str(&self, name: &str) -> Result<Option<String>, EnvChainError> {
        Ok(self
            .get(name)?
            .and_then(|value| value.to_scalar_string()))
    }

    /// Plain value of a field, rendering groups.
    pub fn value(&self, name: &str) -> Result<Option<Value>, EnvChainError> {
        self.resolve_value(name, &Context::new(self))
    }

    /// Store an override for `name`. `ValueSource::None` clears it.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if `name` is not declared.
    /// - `ReadOnlyField` for grouped fields and strict inherited fields.
    ///   Writes to quiet inherited fields are discarded.
    pub fn set(&self, name: &str, value: impl Into<ValueSource>) -> Result<(), EnvChainError> {
        let mut fields = self.fields();
        match fields.get_mut(name) {
            None => Err(EnvChainError::UnknownField(name.to_string())),
            Some(Field::Env { overridden, .. }) => {
                *overridden = value.into();
                Ok(())
            }
            Some(Field::Inherited { options, .. }) if options.quiet => {
                tracing::debug!(field = %name, "discarding write to quiet inherited field");
                Ok(())
            }
            Some(Field::Inherited { .. }) | Some(Field::Grouped(_)) => {
                Err(EnvChainError::ReadOnlyField(name.to_string()))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields().contains_key(name)
    }

    /// Declared field names in render order.
    pub fn names(&self) -> Vec<String> {
        self.fields().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.fields().get(name).map(Field::kind)
    }

    /// Returns true if both handles refer to the same fields.
    pub fn ptr_eq(&self, other: &EnvChain) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn resolve(
        &self,
        name: &str,
        ctx: &Context<'_>,
    ) -> Result<Option<FieldValue>, EnvChainError> {
        // Clone the record so the lock is released before evaluation.
        let Some(field) = self.fields().get(name).cloned() else {
            return Ok(None);
        };

        ctx.enter(name)?;
        let result = self.evaluate(name, field, ctx);
        ctx.leave();
        result
    }

    /// Like `resolve`, but renders grouped values while `name` is still on
    /// the evaluation path, so a group holding its own chain is caught.
    pub(crate) fn resolve_value(
        &self,
        name: &str,
        ctx: &Context<'_>,
    ) -> Result<Option<Value>, EnvChainError> {
        let Some(field) = self.fields().get(name).cloned() else {
            return Ok(None);
        };

        ctx.enter(name)?;
        let result = self
            .evaluate(name, field, ctx)
            .and_then(|value| match value {
                None => Ok(None),
                Some(FieldValue::Value(value)) => Ok(Some(value)),
                Some(FieldValue::Group(nested)) => {
                    let snapshot = nested.render_in(&ctx.nested(&nested))?;
                    Ok(Some(Value::from(snapshot)))
                }
            });
        ctx.leave();
        result
    }

    fn evaluate(
        &self,
        name: &str,
        field: Field,
        ctx: &Context<'_>,
    ) -> Result<Option<FieldValue>, EnvChainError> {
        let value = match field {
            Field::Env {
                lookup,
                default,
                overridden,
                ..
            } => {
                let raw = self.shared.env.var(&lookup);
                match (overridden, default) {
                    (ValueSource::Derive(derivation), _)
                    | (ValueSource::None, ValueSource::Derive(derivation)) => {
                        derive_value(name, &derivation, raw.as_deref(), ctx)?
                    }
                    (ValueSource::Literal(value), _) => value,
                    (ValueSource::None, ValueSource::Literal(default)) => {
                        raw.map(Value::String).unwrap_or(default)
                    }
                    (ValueSource::None, ValueSource::None) => {
                        raw.map(Value::String).unwrap_or(Value::Null)
                    }
                }
            }
            Field::Inherited { from, options } => {
                // Resolved by name on every read, so removals show up immediately.
                if self.contains(&from) {
                    return self.resolve(&from, ctx);
                }
                if options.quiet {
                    return Ok(None);
                }
                return Err(EnvChainError::MissingInheritedValue {
                    name: name.to_string(),
                    from,
                });
            }
            Field::Grouped(nested) => return Ok(Some(FieldValue::Group(nested))),
        };

        Ok(match value {
            Value::Null => None,
            value => Some(FieldValue::Value(value)),
        })
    }
}

fn derive_value(
    name: &str,
    derivation: &Derivation,
    raw: Option<&str>,
    ctx: &Context<'_>,
) -> Result<Value, EnvChainError> {
    derivation.call(raw, ctx).map_err(|err| {
        // Errors raised by the chain itself (through the context) pass through as-is.
        match err.downcast::<EnvChainError>() {
            Ok(inner) => inner,
            Err(source) => EnvChainError::Derivation {
                field: name.to_string(),
                source,
            },
        }
    })
}

impl fmt::Debug for EnvChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvChain")
            .field("fields", &self.names())
            .finish()
    }
}
