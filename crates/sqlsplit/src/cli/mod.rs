//! CLI command implementations.

mod display;

pub mod check;
pub mod split;
pub mod vendors;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Args;
use sqlsplit::{AggregateResult, Config, ConcurrentFileParser, ParseJob, VendorRegistry};

/// Arguments shared by the commands that parse files.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Database vendor (oracle, postgresql, mysql, sqlserver, or a configured one)
    #[arg(short = 't', long = "type")]
    pub vendor: Option<String>,

    /// Maximum number of files split at once
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,

    /// Give up on files that have not finished after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Script files to split
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Resolve the vendor and options, then parse every file.
///
/// An unknown vendor fails here, before any file is opened.
pub async fn parse_files(
    config: &Config,
    registry: &VendorRegistry,
    args: &RunArgs,
) -> sqlsplit::Result<AggregateResult> {
    let vendor = config.vendor_or(args.vendor.as_deref());
    let parser = ConcurrentFileParser::for_vendor(registry, vendor)?
        .with_options(config.parse_options(args.jobs, args.timeout));
    let jobs = args.files.iter().cloned().map(ParseJob::from_path);
    Ok(parser.parse_all(jobs).await)
}
