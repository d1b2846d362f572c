//! Shared test utilities for envchain CLI integration tests.
//!
//! Invariants / Assumptions:
//! - Commands run inside a temporary directory holding the `.env` fixture.
//! - Host variables that change loader behavior are cleared.

use assert_cmd::Command;
use std::fs;
use std::path::Path;

/// Returns an `envchain` command running in `dir` with dotenv loading enabled.
pub fn envchain_cmd(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("envchain");
    cmd.current_dir(dir)
        .env_remove("DOTENV_DISABLED")
        .env_remove("ENVCHAIN_PATH")
        .env_remove("RUST_LOG")
        .env_remove("VARIABLE_1")
        .env_remove("VARIABLE_2");
    cmd
}

/// Writes the standard two-variable `.env` fixture into `dir`.
pub fn write_fixture(dir: &Path) {
    fs::write(
        dir.join(".env"),
        "VARIABLE_1=variable_1\nVARIABLE_2=variable_2\n",
    )
    .unwrap();
}
