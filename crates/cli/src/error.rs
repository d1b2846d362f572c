//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `EnvChainError` variants to appropriate exit codes.
//!
//! Invariants:
//! - Exit codes 1-4 are reserved for specific error categories.

use envchain::EnvChainError;

/// Structured exit codes for envchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Unhandled or generic failure.
    GeneralError = 1,

    /// The dotenv file exists but could not be read or parsed.
    LoadError = 2,

    /// A declaration was rejected (duplicate target, unknown source, reserved name).
    DeclarationError = 3,

    /// A field could not be evaluated.
    EvaluationError = 4,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }

    /// Pick the exit code for an error, looking through added context.
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.downcast_ref::<EnvChainError>()
            .map_or(Self::GeneralError, Self::from_chain_error)
    }

    fn from_chain_error(err: &EnvChainError) -> Self {
        match err {
            e if e.is_load_error() => Self::LoadError,
            EnvChainError::DuplicateField(_)
            | EnvChainError::UnknownSourceField { .. }
            | EnvChainError::ReservedName(_) => Self::DeclarationError,
            EnvChainError::MissingInheritedValue { .. }
            | EnvChainError::CircularReference { .. }
            | EnvChainError::Derivation { .. } => Self::EvaluationError,
            _ => Self::GeneralError,
        }
    }
}
