//! envchain - render environment configuration from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and load options.
//! - Build a chain from the ordered declarations and print the result.
//!
//! Does NOT handle:
//! - Field evaluation semantics (see `crates/envchain`).
//!
//! Invariants:
//! - Logs go to stderr; stdout carries only the rendered output.
//! - Variable values from the dotenv file are never logged.

mod args;
mod declare;
mod error;
mod output;

use anyhow::{Context, Result, bail};
use args::{Cli, Commands};
use clap::Parser;
use declare::Declaration;
use envchain::{EnvChain, EnvLoader, LoadOptions};
use error::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(ExitCode::from_error(&e).as_i32());
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = LoadOptions::new()
        .with_path(&cli.path)
        .with_override(cli.override_existing)
        .with_debug(cli.debug_load);

    match cli.command {
        Commands::Render {
            format,
            declarations,
        } => {
            let chain = build_chain(options, &declarations)?;
            let snapshot = chain.render().context("Failed to render configuration")?;
            println!("{}", output::format_snapshot(&snapshot, format)?);
        }
        Commands::Get { name, declarations } => {
            let chain = build_chain(options, &declarations)?;
            if !chain.contains(&name) {
                bail!("Field '{}' is not declared", name);
            }
            let value = chain
                .value(&name)
                .with_context(|| format!("Failed to evaluate '{}'", name))?
                .unwrap_or_default();
            println!("{}", output::display_value(&value));
        }
        Commands::Inspect => {
            let (_, report) = EnvLoader::new(options)
                .load_with_report()
                .context("Failed to load environment")?;
            if report.disabled {
                eprintln!("DOTENV_DISABLED is set; no file was loaded");
            } else if report.path.is_none() {
                eprintln!("No dotenv file found at {}", cli.path.display());
            }
            for name in report.loaded {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn build_chain(options: LoadOptions, declarations: &[Declaration]) -> Result<EnvChain> {
    let chain = EnvChain::new(options).context("Failed to load environment")?;
    for declaration in declarations {
        declaration
            .apply(&chain)
            .with_context(|| format!("Invalid declaration {:?}", declaration))?;
    }
    tracing::debug!(fields = chain.len(), "built chain from declarations");
    Ok(chain)
}
