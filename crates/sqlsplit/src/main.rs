//! sqlsplit CLI - split SQL scripts into executable statements.
//!
//! Reads one or more script files, splits them with the chosen vendor's
//! rules, and prints the statements or a pass/fail summary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sqlsplit::Config;
use tracing_subscriber::EnvFilter;

mod cli;

/// sqlsplit: vendor-aware SQL script splitter.
#[derive(Parser)]
#[command(name = "sqlsplit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./sqlsplit.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split scripts and print their statements
    Split {
        #[command(flatten)]
        run: cli::RunArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Split scripts and report which ones fail
    Check {
        #[command(flatten)]
        run: cli::RunArgs,
    },

    /// List registered database vendors
    Vendors,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::discover()
            .await
            .context("failed to load sqlsplit.yaml")?,
    };
    let registry = config.registry().context("invalid vendor configuration")?;

    match cli.command {
        Commands::Split { run, json } => cli::split::run(&config, &registry, &run, json).await,
        Commands::Check { run } => cli::check::run(&config, &registry, &run).await,
        Commands::Vendors => {
            cli::vendors::run(&config, &registry)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
