//! Dotenv loading for chain environments.
//!
//! Responsibilities:
//! - Read a `.env`-style file into a `LayeredEnv` over a base source.
//! - Enforce the `DOTENV_DISABLED` gate so tests can skip file loading.
//! - Map dotenvy failures onto `EnvChainError` without leaking file contents.
//!
//! Does NOT handle:
//! - Writing loaded values into the process environment.
//!
//! Invariants / Assumptions:
//! - A missing file is not an error; it yields the base source unchanged.
//! - Loading is repeatable: every call re-reads the file and builds a fresh layer.
//! - Within one file the first assignment of a name wins, unless
//!   `override_existing` is set, in which case the last one wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{EnvSource, LayeredEnv, ProcessEnv};
use crate::error::EnvChainError;

/// Default dotenv file, resolved against the working directory.
pub const DEFAULT_DOTENV_PATH: &str = ".env";

/// Options for the environment load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File to read variables from.
    pub path: PathBuf,
    /// Let file values win over variables already present in the base source.
    pub override_existing: bool,
    /// Log the name of every variable read from the file.
    pub debug: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DOTENV_PATH),
            override_existing: false,
            debug: false,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file to load.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Let file values replace variables already set in the base source.
    pub fn with_override(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    /// Log loaded variable names at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Outcome of a single load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The file that was read, if one existed.
    pub path: Option<PathBuf>,
    /// Variable names read from the file, in file order.
    pub loaded: Vec<String>,
    /// True when `DOTENV_DISABLED` suppressed file loading.
    pub disabled: bool,
}

/// Produces the environment source for a chain.
///
/// Chains keep their loader so that `group` and `fork` can re-run the same
/// load step for the accumulators they create.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    origin: Origin,
}

#[derive(Debug, Clone)]
enum Origin {
    Dotenv {
        options: LoadOptions,
        base: Arc<dyn EnvSource>,
    },
    Fixed(Arc<dyn EnvSource>),
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl EnvLoader {
    /// Load `options.path` layered over the process environment.
    pub fn new(options: LoadOptions) -> Self {
        Self::with_base(options, Arc::new(ProcessEnv))
    }

    /// Load `options.path` layered over `base`.
    ///
    /// `${VAR}` substitutions inside the file are expanded by dotenvy against
    /// the process environment and earlier lines of the file, never against
    /// `base`.
    pub fn with_base(options: LoadOptions, base: Arc<dyn EnvSource>) -> Self {
        Self {
            origin: Origin::Dotenv { options, base },
        }
    }

    /// Skip file loading and hand out an already populated source.
    pub fn from_source(source: Arc<dyn EnvSource>) -> Self {
        Self {
            origin: Origin::Fixed(source),
        }
    }

    /// The dotenv options, if this loader reads a file.
    pub fn options(&self) -> Option<&LoadOptions> {
        match &self.origin {
            Origin::Dotenv { options, .. } => Some(options),
            Origin::Fixed(_) => None,
        }
    }

    /// Run the load step and return the resulting source.
    pub fn load(&self) -> Result<Arc<dyn EnvSource>, EnvChainError> {
        self.load_with_report().map(|(source, _)| source)
    }

    /// Run the load step, also reporting what was read.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but has invalid syntax (`EnvChainError::DotenvParse`)
    /// - The file exists but cannot be read (`EnvChainError::DotenvIo`)
    ///
    /// Missing files are silently ignored.
    pub fn load_with_report(&self) -> Result<(Arc<dyn EnvSource>, LoadReport), EnvChainError> {
        let (options, base) = match &self.origin {
            Origin::Fixed(source) => return Ok((Arc::clone(source), LoadReport::default())),
            Origin::Dotenv { options, base } => (options, base),
        };

        if dotenv_disabled(&**base) {
            tracing::debug!("DOTENV_DISABLED is set, skipping dotenv loading");
            let report = LoadReport {
                disabled: true,
                ..LoadReport::default()
            };
            return Ok((Arc::clone(base), report));
        }

        let Some(entries) = read_dotenv(&options.path)? else {
            tracing::debug!(path = %options.path.display(), "dotenv file not found, using base environment");
            return Ok((Arc::clone(base), LoadReport::default()));
        };

        let mut loaded = Vec::with_capacity(entries.len());
        let mut file = HashMap::with_capacity(entries.len());
        for (name, value) in entries {
            if options.debug {
                tracing::debug!(var = %name, "loaded variable from dotenv file");
            }
            if options.override_existing {
                file.insert(name.clone(), value);
            } else {
                file.entry(name.clone()).or_insert(value);
            }
            if !loaded.contains(&name) {
                loaded.push(name);
            }
        }

        tracing::debug!(
            path = %options.path.display(),
            count = loaded.len(),
            "loaded dotenv file"
        );

        let report = LoadReport {
            path: Some(options.path.clone()),
            loaded,
            disabled: false,
        };
        let source: Arc<dyn EnvSource> = Arc::new(LayeredEnv::new(
            file,
            Arc::clone(base),
            options.override_existing,
        ));
        Ok((source, report))
    }
}

/// Check if dotenv loading is disabled via `DOTENV_DISABLED` in the base source.
fn dotenv_disabled(base: &dyn EnvSource) -> bool {
    matches!(
        base.var("DOTENV_DISABLED").as_deref(),
        Some("true") | Some("1")
    )
}

/// Read all entries from a dotenv file. `Ok(None)` means the file does not exist.
fn read_dotenv(path: &Path) -> Result<Option<Vec<(String, String)>>, EnvChainError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if is_not_found(&e) => return Ok(None),
        Err(e) => return Err(map_dotenv_error(path, e)),
    };

    iter.map(|item| item.map_err(|e| map_dotenv_error(path, e)))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Check if a dotenv error indicates the file was not found.
fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}

fn map_dotenv_error(path: &Path, err: dotenvy::Error) -> EnvChainError {
    let path = path.to_path_buf();
    match err {
        dotenvy::Error::LineParse(_, error_index) => EnvChainError::DotenvParse { path, error_index },
        dotenvy::Error::Io(io_err) => EnvChainError::DotenvIo {
            path,
            kind: io_err.kind(),
        },
        _ => EnvChainError::DotenvUnknown { path },
    }
}
