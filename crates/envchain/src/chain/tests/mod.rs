//! Tests for the chain operations.
//!
//! Responsibilities:
//! - Test value resolution for direct, aliased and derived fields.
//! - Test inheritance, removal, grouping, rendering and forking.
//!
//! Invariants:
//! - Tests run against an in-memory `MapEnv`, never the process environment.

use std::sync::Arc;

use crate::chain::EnvChain;
use crate::env::{EnvSource, MapEnv};

pub mod remove_tests;

/// The variables every test environment starts with.
pub fn fixture_env() -> Arc<MapEnv> {
    Arc::new(
        MapEnv::new()
            .with_var("VARIABLE_1", "variable_1")
            .with_var("VARIABLE_2", "variable_2"),
    )
}

/// A fresh chain over [`fixture_env`].
pub fn fixture_chain() -> EnvChain {
    let env: Arc<dyn EnvSource> = fixture_env();
    EnvChain::with_source(env)
}
