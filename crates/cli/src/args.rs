//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse load options and the ordered list of declarations.
//!
//! Non-responsibilities:
//! - Does not build chains (see `main.rs` and `declare.rs`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::declare::Declaration;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "envchain")]
#[command(about = "Declare configuration fields over a .env file and render them", long_about = None)]
#[command(version)]
#[command(
    after_help = "Declarations (applied in order):\n  NAME[=DEFAULT]               same as add:NAME[=DEFAULT]\n  add:NAME[=DEFAULT]           read NAME from the environment\n  alias:NAME:ENV[=DEFAULT]     read NAME from the variable ENV\n  inherit:NAME:FROM[:quiet]    copy the current value of FROM\n  remove:NAME                  drop a field\n\nExamples:\n  envchain render HOST=localhost alias:PORT:APP_PORT=8080\n  envchain --path .env.test render -f dotenv DATABASE_URL inherit:READ_URL:DATABASE_URL\n  envchain get PORT alias:PORT:APP_PORT=8080\n"
)]
pub struct Cli {
    /// Dotenv file to load (missing files are ignored)
    #[arg(long, global = true, env = "ENVCHAIN_PATH", default_value = ".env")]
    pub path: PathBuf,

    /// Let values from the file replace variables already set in the process
    #[arg(long = "override", global = true)]
    pub override_existing: bool,

    /// Log the name of every variable loaded from the file (needs RUST_LOG=debug)
    #[arg(long, global = true)]
    pub debug_load: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply declarations and print the rendered snapshot
    Render {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Field declarations, applied in order
        declarations: Vec<Declaration>,
    },

    /// Apply declarations and print a single field
    Get {
        /// Field to print
        name: String,

        /// Field declarations, applied in order
        declarations: Vec<Declaration>,
    },

    /// List the variable names provided by the dotenv file
    Inspect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_parses_ordered_declarations() {
        let cli = Cli::try_parse_from([
            "envchain",
            "render",
            "-f",
            "dotenv",
            "HOST=localhost",
            "remove:HOST",
        ])
        .unwrap();

        match cli.command {
            Commands::Render {
                format,
                declarations,
            } => {
                assert_eq!(format, OutputFormat::Dotenv);
                assert_eq!(declarations.len(), 2);
                assert!(matches!(declarations[1], Declaration::Remove { .. }));
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_invalid_declaration_is_rejected() {
        let result = Cli::try_parse_from(["envchain", "render", "bogus:NAME"]);
        assert!(result.is_err());
    }
}
