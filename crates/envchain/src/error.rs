//! Error types for environment loading and field evaluation.
//!
//! Responsibilities:
//! - Define error variants for declaration, evaluation and loading failures.
//! - Preserve the original error raised inside a derivation closure.
//!
//! Invariants:
//! - Every variant names the field or file involved.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by chain operations and by the environment loader.
#[derive(Error, Debug)]
pub enum EnvChainError {
    /// `inherit` was asked to declare a name that already exists.
    #[error("Cannot inherit into '{0}': a field with that name already exists")]
    DuplicateField(String),

    /// `inherit` referenced a source field that is not declared.
    #[error("Cannot inherit '{name}' from '{from}': no such field")]
    UnknownSourceField { name: String, from: String },

    /// A strict inherited field was read after its source was removed.
    #[error("Missing inherited value: '{name}' inherits from '{from}', which no longer exists")]
    MissingInheritedValue { name: String, from: String },

    /// A write was attempted on a grouped or strict inherited field.
    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    /// A write targeted a name that was never declared.
    #[error("No field named '{0}'")]
    UnknownField(String),

    /// The name belongs to a chain operation.
    #[error("'{0}' is reserved for a chain operation and cannot name a field")]
    ReservedName(String),

    /// Evaluating a field required its own value.
    #[error("Circular reference while evaluating: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    /// A derivation closure returned an error.
    #[error("Failed to derive value for '{field}': {source}")]
    Derivation {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse {} at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading",
        path.display()
    )]
    DotenvParse { path: PathBuf, error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read {}: {kind}", path.display())]
    DotenvIo { path: PathBuf, kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    ///
    /// SAFETY: This error does not include any raw dotenv content.
    #[error(
        "Failed to load {}. Hint: set DOTENV_DISABLED=1 to skip .env loading",
        path.display()
    )]
    DotenvUnknown { path: PathBuf },
}

impl EnvChainError {
    /// Returns true for errors raised while loading the environment file.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::DotenvParse { .. } | Self::DotenvIo { .. } | Self::DotenvUnknown { .. }
        )
    }
}
