//! `sqlsplit check` command implementation.

use std::process::ExitCode;

use colored::Colorize;
use sqlsplit::{Config, VendorRegistry};

use super::RunArgs;
use super::display::{preview, print_file_error, print_incomplete};

/// Run the check command.
pub async fn run(
    config: &Config,
    registry: &VendorRegistry,
    args: &RunArgs,
) -> anyhow::Result<ExitCode> {
    let result = super::parse_files(config, registry, args).await?;

    let mut failed = 0usize;
    for (id, outcome) in result.sorted() {
        match outcome {
            Ok(script) => {
                let first = script.statements().first().map(preview).unwrap_or_default();
                println!(
                    "  {} {}: {} statements, {} procedural  {}",
                    "✓".green().bold(),
                    id,
                    script.len(),
                    script.procedural_count(),
                    first.dimmed()
                );
            }
            Err(error) => {
                failed += 1;
                print_file_error(error);
            }
        }
    }
    print_incomplete(&result);

    println!();
    let summary = format!(
        "{} files, {} ok, {} failed, {} unfinished ({:.2?})",
        result.submitted(),
        result.len() - failed,
        failed,
        result.pending().len(),
        result.elapsed()
    );
    if failed == 0 && result.is_complete() {
        println!("{}", summary.green());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", summary.red());
        Ok(ExitCode::FAILURE)
    }
}
