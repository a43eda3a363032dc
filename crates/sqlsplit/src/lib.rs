//! # sqlsplit: Vendor-Aware SQL Script Splitting
//!
//! sqlsplit turns raw SQL script text into an ordered list of individually
//! executable statements, recognising the procedural blocks of each database
//! vendor (PL/SQL, PL/pgSQL, MySQL stored programs, T-SQL) so that semicolons
//! inside a block body never split it.
//!
//! ## Design Philosophy
//!
//! - **Lexically aware, not a parser** - strings, quoted identifiers, comments
//!   and dollar quotes are respected; SQL grammar is not validated
//! - **Vendors are data** - a vendor is a small classifier behind a trait, and
//!   new ones are registered without touching the splitter
//! - **Per-file isolation** - one malformed file never affects another in a
//!   concurrent run
//!
//! ## Quick Start
//!
//! ```
//! use sqlsplit::{Splitter, VendorRegistry};
//!
//! let oracle = VendorRegistry::builtin().get("oracle")?;
//! let script = Splitter::new(oracle.as_ref()).split(
//!     "SELECT 1 FROM dual;\nBEGIN\n  NULL;\nEND;\n/\n",
//! )?;
//!
//! assert_eq!(script.len(), 2);
//! assert!(script.statements()[1].is_procedural());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! For many files at once see [`ConcurrentFileParser`].

pub mod config;
mod error;
pub mod parallel;
mod registry;
mod splitter;
mod statement;
pub mod vendors;

pub use config::Config;
pub use error::{Error, FileError, FileErrorKind, Location, Result, SplitError};
pub use parallel::{
    AggregateResult, ConcurrentFileParser, FileOutcome, JobSource, ParseJob, ParseOptions,
    RunStatus,
};
pub use registry::VendorRegistry;
pub use splitter::{Splitter, split};
pub use statement::{ParsedScript, Statement, StatementKind};
pub use vendors::{BlockEnd, CustomVendor, CustomVendorConfig, Vendor, VendorClassifier};
