//! Field records stored by a chain.
//!
//! Responsibilities:
//! - Describe how each declared field produces its value.
//! - Hold caller-supplied defaults, overrides and derivation closures.
//!
//! Does NOT handle:
//! - Evaluation order or dependency tracking (see `chain/mod.rs`).

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::EnvChain;
use super::context::Context;

type DeriveFn = dyn Fn(Option<&str>, &Context<'_>) -> anyhow::Result<Value> + Send + Sync;

/// A function computing a field value from the raw environment string and
/// the chain's other fields.
#[derive(Clone)]
pub struct Derivation(Arc<DeriveFn>);

impl Derivation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&str>, &Context<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, raw: Option<&str>, ctx: &Context<'_>) -> anyhow::Result<Value> {
        (self.0)(raw, ctx)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derivation(..)")
    }
}

/// Shorthand for `ValueSource::Derive(Derivation::new(f))`.
pub fn derive<F>(f: F) -> ValueSource
where
    F: Fn(Option<&str>, &Context<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    ValueSource::Derive(Derivation::new(f))
}

/// A default or override for an environment-backed field.
#[derive(Clone, Debug, Default)]
pub enum ValueSource {
    /// Nothing supplied. As an override this clears any stored value.
    #[default]
    None,
    /// A fixed value.
    Literal(Value),
    /// A value computed on every read.
    Derive(Derivation),
}

impl ValueSource {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<&str> for ValueSource {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for ValueSource {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<Value> for ValueSource {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            value => Self::Literal(value),
        }
    }
}

impl From<Derivation> for ValueSource {
    fn from(derivation: Derivation) -> Self {
        Self::Derive(derivation)
    }
}

impl<T: Into<ValueSource>> From<Option<T>> for ValueSource {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Read-time policy for inherited fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InheritOptions {
    /// Read a missing source as unset and discard writes instead of failing.
    pub quiet: bool,
}

impl InheritOptions {
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

/// How a declared field produces its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Reads the environment by its own name.
    Direct,
    /// Reads the environment by another name.
    Aliased,
    /// Computes its value with a derivation.
    Derived,
    /// Reads another field live.
    Inherited,
    /// Holds a nested chain.
    Grouped,
}

#[derive(Clone, Debug)]
pub(crate) enum Field {
    Env {
        /// Environment name to read; differs from the field name for aliases.
        lookup: String,
        aliased: bool,
        default: ValueSource,
        overridden: ValueSource,
    },
    Inherited {
        from: String,
        options: InheritOptions,
    },
    Grouped(EnvChain),
}

impl Field {
    pub(crate) fn env(lookup: String, aliased: bool, default: ValueSource) -> Self {
        Self::Env {
            lookup,
            aliased,
            default,
            overridden: ValueSource::None,
        }
    }

    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            Self::Env {
                default: ValueSource::Derive(_),
                ..
            } => FieldKind::Derived,
            Self::Env { aliased: true, .. } => FieldKind::Aliased,
            Self::Env { .. } => FieldKind::Direct,
            Self::Inherited { .. } => FieldKind::Inherited,
            Self::Grouped(_) => FieldKind::Grouped,
        }
    }
}
