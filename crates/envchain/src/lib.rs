//! Chainable builder for typed environment configuration.
//!
//! This crate loads key/value pairs from an environment source (a `.env`
//! file layered over the process environment by default) and lets callers
//! declare named configuration fields one call at a time. Fields may read
//! the environment directly or through an alias, fall back to a default,
//! derive their value from sibling fields, inherit another field live, or
//! hold a nested group of fields.
//!
//! ```no_run
//! use envchain::{EnvChain, InheritOptions, LoadOptions, derive};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), envchain::EnvChainError> {
//! let chain = EnvChain::new(LoadOptions::default())?;
//! chain
//!     .add("HOST", "localhost")
//!     .alias("PORT", "APP_PORT", "8080")
//!     .add("URL", derive(|_, ctx| {
//!         let host = ctx.get_str("HOST")?.unwrap_or_default();
//!         let port = ctx.get_str("PORT")?.unwrap_or_default();
//!         Ok(json!(format!("http://{host}:{port}")))
//!     }))
//!     .inherit("PUBLIC_URL", "URL", InheritOptions::default())?;
//!
//! let snapshot = chain.render()?;
//! println!("{}", serde_json::to_string_pretty(&snapshot).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod env;
mod error;

pub use chain::{
    Context, Derivation, EnvChain, FieldKind, FieldValue, InheritOptions, RESERVED_NAMES,
    Snapshot, ValueSource, derive, is_reserved,
};
pub use env::{EnvLoader, EnvSource, LayeredEnv, LoadOptions, LoadReport, MapEnv, ProcessEnv};
pub use error::EnvChainError;

/// Values produced by fields. `Value::Null` stands for an unset value.
pub use serde_json::Value;
