//! Command-line field declarations.
//!
//! Responsibilities:
//! - Parse declaration arguments (`add:`, `alias:`, `inherit:`, `remove:`).
//! - Apply parsed declarations to a chain in order.
//!
//! Invariants:
//! - A default is everything after the first `=`, so defaults may contain `:`.
//! - An argument without a known kind prefix is an `add`.

use std::str::FromStr;

use envchain::{EnvChain, EnvChainError, InheritOptions, ValueSource};
use thiserror::Error;

/// One declaration from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Add {
        name: String,
        default: Option<String>,
    },
    Alias {
        name: String,
        env_name: String,
        default: Option<String>,
    },
    Inherit {
        name: String,
        from: String,
        quiet: bool,
    },
    Remove {
        name: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("empty declaration")]
    Empty,

    #[error("unknown declaration kind '{0}' (expected add, alias, inherit or remove)")]
    UnknownKind(String),

    #[error("'{0}' declaration needs a field name")]
    MissingName(&'static str),

    #[error("alias needs an environment variable name: alias:NAME:ENV[=DEFAULT]")]
    MissingEnvName,

    #[error("inherit needs a source field: inherit:NAME:FROM[:quiet]")]
    MissingSource,

    #[error("unknown inherit flag '{0}' (expected 'quiet')")]
    UnknownFlag(String),
}

impl FromStr for Declaration {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DeclarationError::Empty);
        }

        let (kind, rest) = match s.split_once(':') {
            Some((kind, rest)) if !kind.contains('=') => (kind, rest),
            _ => ("add", s),
        };

        match kind {
            "add" => {
                let (name, default) = split_default(rest);
                Ok(Self::Add {
                    name: field_name("add", name)?,
                    default,
                })
            }
            "alias" => {
                let (target, default) = split_default(rest);
                let (name, env_name) = target
                    .split_once(':')
                    .ok_or(DeclarationError::MissingEnvName)?;
                if env_name.is_empty() {
                    return Err(DeclarationError::MissingEnvName);
                }
                Ok(Self::Alias {
                    name: field_name("alias", name)?,
                    env_name: env_name.to_string(),
                    default,
                })
            }
            "inherit" => {
                let mut parts = rest.splitn(3, ':');
                let name = field_name("inherit", parts.next().unwrap_or_default())?;
                let from = parts
                    .next()
                    .filter(|from| !from.is_empty())
                    .ok_or(DeclarationError::MissingSource)?
                    .to_string();
                let quiet = match parts.next() {
                    None => false,
                    Some("quiet") => true,
                    Some(flag) => return Err(DeclarationError::UnknownFlag(flag.to_string())),
                };
                Ok(Self::Inherit { name, from, quiet })
            }
            "remove" => Ok(Self::Remove {
                name: field_name("remove", rest)?,
            }),
            other => Err(DeclarationError::UnknownKind(other.to_string())),
        }
    }
}

fn split_default(s: &str) -> (&str, Option<String>) {
    match s.split_once('=') {
        Some((name, default)) => (name, Some(default.to_string())),
        None => (s, None),
    }
}

fn field_name(kind: &'static str, name: &str) -> Result<String, DeclarationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DeclarationError::MissingName(kind));
    }
    Ok(name.to_string())
}

impl Declaration {
    /// Apply this declaration to `chain`.
    pub fn apply(&self, chain: &EnvChain) -> Result<(), EnvChainError> {
        match self {
            Self::Add { name, default } => {
                chain.add(name.as_str(), ValueSource::from(default.clone()));
            }
            Self::Alias {
                name,
                env_name,
                default,
            } => {
                chain.alias(
                    name.as_str(),
                    env_name.as_str(),
                    ValueSource::from(default.clone()),
                );
            }
            Self::Inherit { name, from, quiet } => {
                chain.inherit(name.as_str(), from.as_str(), InheritOptions { quiet: *quiet })?;
            }
            Self::Remove { name } => {
                chain.remove(name);
            }
        }
        Ok(())
    }
}
