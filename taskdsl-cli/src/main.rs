//! taskdsl — inspect and run task manifests.
//!
//! # Usage
//!
//! ```text
//! taskdsl init [--force]
//! taskdsl list [--json]
//! taskdsl check
//! taskdsl run <task> [--scope <scope>] [--arg key=value]...
//! ```
//!
//! Every command accepts `--manifest <path>`; the default is
//! `~/.taskdsl/tasks.yaml`.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, init::InitArgs, list::ListArgs, run::RunArgs};
use taskdsl_core::manifest;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "taskdsl",
    version,
    about = "Declare, inspect and run scoped task definitions",
    long_about = None,
)]
struct Cli {
    /// Task manifest to read. Defaults to ~/.taskdsl/tasks.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter task manifest.
    Init(InitArgs),

    /// List flat and scoped tasks declared by the manifest.
    List(ListArgs),

    /// Validate the manifest against the namespace rules.
    Check(CheckArgs),

    /// Invoke a task's action and print its result.
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let manifest_path = resolve_manifest_path(cli.manifest)?;
    match cli.command {
        Commands::Init(args) => args.run(&manifest_path),
        Commands::List(args) => args.run(&manifest_path),
        Commands::Check(args) => args.run(&manifest_path),
        Commands::Run(args) => args.run(&manifest_path),
    }
}

fn resolve_manifest_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => manifest::manifest_path().context("could not determine home directory"),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
