//! Environment sources consumed by chains.
//!
//! Responsibilities:
//! - Define the `EnvSource` lookup seam used by direct and aliased fields.
//! - Provide process, in-memory, and dotenv-layered implementations.
//! - Load `.env` files into a layered source (see `loader.rs`).
//!
//! Does NOT handle:
//! - Field declaration or evaluation (see `chain`).
//!
//! Invariants:
//! - Lookups are by exact name and never mutate the source.
//! - Loading never writes to the process environment.

mod loader;

pub use loader::{EnvLoader, LoadOptions, LoadReport};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A read-only `name -> value` lookup.
pub trait EnvSource: Send + Sync + fmt::Debug {
    /// Look up a variable by its exact name.
    fn var(&self, name: &str) -> Option<String>;
}

impl<S: EnvSource + ?Sized> EnvSource for Arc<S> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Live lookups against the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory environment, useful for embedding and hermetic tests.
///
/// The mapping can be changed after construction through [`MapEnv::set`] and
/// [`MapEnv::unset`]; chains holding the source observe changes on their
/// next read.
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_var(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    pub fn unset(&self, name: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Entries read from a dotenv file layered with a base source.
///
/// Without `override_existing`, a variable present in the base wins over the
/// file (variables that are already set are never replaced). With it, the
/// file wins.
pub struct LayeredEnv {
    file: HashMap<String, String>,
    base: Arc<dyn EnvSource>,
    override_existing: bool,
}

impl LayeredEnv {
    pub fn new(
        file: HashMap<String, String>,
        base: Arc<dyn EnvSource>,
        override_existing: bool,
    ) -> Self {
        Self {
            file,
            base,
            override_existing,
        }
    }
}

impl fmt::Debug for LayeredEnv {
    // Values are deliberately omitted; they routinely hold secrets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredEnv")
            .field("file_vars", &self.file.len())
            .field("base", &self.base)
            .field("override_existing", &self.override_existing)
            .finish()
    }
}

impl EnvSource for LayeredEnv {
    fn var(&self, name: &str) -> Option<String> {
        let from_file = || self.file.get(name).cloned();
        if self.override_existing {
            from_file().or_else(|| self.base.var(name))
        } else {
            self.base.var(name).or_else(from_file)
        }
    }
}
