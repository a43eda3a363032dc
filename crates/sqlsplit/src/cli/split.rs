//! `sqlsplit split` command implementation.

use std::process::ExitCode;

use colored::Colorize;
use serde_json::json;
use sqlsplit::{AggregateResult, Config, VendorRegistry};

use super::RunArgs;
use super::display::{print_file_error, print_incomplete, print_statement};

/// Run the split command.
pub async fn run(
    config: &Config,
    registry: &VendorRegistry,
    args: &RunArgs,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let result = super::parse_files(config, registry, args).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&result))?);
    } else {
        print_text(&result);
    }

    if result.failures().next().is_some() || !result.is_complete() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_text(result: &AggregateResult) {
    for (id, outcome) in result.sorted() {
        match outcome {
            Ok(script) => {
                println!(
                    "{} {}",
                    id.white().bold(),
                    format!("({} statements)", script.len()).dimmed()
                );
                for (index, statement) in script.numbered() {
                    print_statement(index, statement);
                }
                println!();
            }
            Err(error) => print_file_error(error),
        }
    }
    print_incomplete(result);
}

fn to_json(result: &AggregateResult) -> serde_json::Value {
    let files: serde_json::Map<String, serde_json::Value> = result
        .sorted()
        .into_iter()
        .map(|(id, outcome)| {
            let value = match outcome {
                Ok(script) => json!({ "statements": script }),
                Err(error) => json!({ "error": error }),
            };
            (id.to_string(), value)
        })
        .collect();

    json!({
        "status": result.status(),
        "files": files,
        "pending": result.pending(),
    })
}
