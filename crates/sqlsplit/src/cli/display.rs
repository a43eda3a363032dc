//! Common display utilities for CLI commands.

use colored::Colorize;
use sqlsplit::{AggregateResult, FileError, RunStatus, Statement};

const PREVIEW_WIDTH: usize = 72;

/// Print one file error.
pub fn print_file_error(error: &FileError) {
    println!(
        "  {} {}: {} ({})",
        "✗".red().bold(),
        error.id.white().bold(),
        error.message,
        error.kind.to_string().dimmed()
    );
}

/// Print a numbered statement.
pub fn print_statement(index: usize, statement: &Statement) {
    let label = format!("[{index}]");
    let kind = if statement.is_procedural() {
        statement.kind().as_str().yellow()
    } else {
        statement.kind().as_str().dimmed()
    };
    println!("{} {}", label.cyan(), kind);
    for line in statement.text().lines() {
        println!("    {line}");
    }
}

/// First line of a statement, truncated for one-line summaries.
pub fn preview(statement: &Statement) -> String {
    let first = statement.text().lines().next().unwrap_or_default();
    if first.chars().count() > PREVIEW_WIDTH {
        let cut: String = first.chars().take(PREVIEW_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}

/// Print the abandoned files after an early stop.
pub fn print_incomplete(result: &AggregateResult) {
    let reason = match result.status() {
        RunStatus::Complete => return,
        RunStatus::DeadlineExpired => "deadline expired",
        RunStatus::Cancelled => "cancelled",
    };
    println!(
        "{}: {} of {} files did not finish",
        reason.yellow().bold(),
        result.pending().len(),
        result.submitted()
    );
    for id in result.pending() {
        println!("    {} {}", "•".dimmed(), id);
    }
}
