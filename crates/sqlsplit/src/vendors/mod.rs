//! Vendor-specific statement classification.
//!
//! Each supported database implements the `VendorClassifier` trait, which
//! tells the splitter three things:
//!
//! - whether a statement opens a procedural block
//! - which delimiter ends ordinary statements
//! - which marker ends a procedural block
//!
//! ## Adding a New Vendor
//!
//! Built-in vendors are listed in the `Vendor` enum. Anything else can be
//! added at start-up through `VendorRegistry::register`, either with a
//! hand-written `VendorClassifier` or with a data-driven `CustomVendor`
//! loaded from configuration. The splitter never needs to change.

pub mod custom;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlserver;
mod tokens;

pub use custom::{BlockEndSpec, CustomVendor, CustomVendorConfig, KeywordPattern};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// How a procedural block is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd<'a> {
    /// A line whose only non-whitespace content is this token (`/`, `GO`)
    Line(&'a str),
    /// Whatever delimiter is active when the block ends
    ActiveDelimiter,
}

/// Classifier capability supplied by every database vendor.
pub trait VendorClassifier: Send + Sync {
    /// Canonical lowercase vendor name.
    fn name(&self) -> &str;

    /// Does `text` start a procedural block?
    ///
    /// `text` begins at the first significant token of a statement and may
    /// run to the end of the script; only the leading tokens are inspected.
    fn is_procedural_start(&self, text: &str) -> bool;

    /// Delimiter for ordinary statements at the start of a script.
    fn default_delimiter(&self) -> &str {
        ";"
    }

    /// Terminator for procedural blocks.
    fn block_end(&self) -> BlockEnd<'_>;

    /// Whether `DELIMITER <token>` lines redefine the active delimiter.
    fn supports_delimiter_directive(&self) -> bool {
        false
    }

    /// Whether `$tag$ ... $tag$` bodies are treated as opaque literals.
    fn supports_dollar_quoting(&self) -> bool {
        false
    }

    /// Whether a backslash escapes the next character inside quotes.
    ///
    /// Doubled quotes (`''`) escape a quote for every vendor.
    fn supports_backslash_escapes(&self) -> bool {
        false
    }

    /// Default server port, for display only.
    fn default_port(&self) -> Option<u16> {
        None
    }
}

impl std::fmt::Debug for dyn VendorClassifier + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorClassifier")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Built-in database vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Oracle (PL/SQL, `/` terminated blocks)
    Oracle,
    /// PostgreSQL (PL/pgSQL, dollar-quoted bodies)
    PostgreSql,
    /// MySQL / MariaDB (`DELIMITER` directive)
    MySql,
    /// Microsoft SQL Server (T-SQL, `GO` batches)
    SqlServer,
}

impl Vendor {
    /// Every built-in vendor.
    pub const ALL: [Vendor; 4] = [
        Vendor::Oracle,
        Vendor::PostgreSql,
        Vendor::MySql,
        Vendor::SqlServer,
    ];

    /// Registry name of the vendor.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
        }
    }

    /// The classifier implementing this vendor.
    #[must_use]
    pub fn classifier(&self) -> &'static dyn VendorClassifier {
        match self {
            Self::Oracle => &oracle::OracleVendor,
            Self::PostgreSql => &postgres::PostgresVendor,
            Self::MySql => &mysql::MySqlVendor,
            Self::SqlServer => &sqlserver::SqlServerVendor,
        }
    }

    /// An owned handle to the classifier, as stored in a registry.
    #[must_use]
    pub fn shared(&self) -> Arc<dyn VendorClassifier> {
        match self {
            Self::Oracle => Arc::new(oracle::OracleVendor),
            Self::PostgreSql => Arc::new(postgres::PostgresVendor),
            Self::MySql => Arc::new(mysql::MySqlVendor),
            Self::SqlServer => Arc::new(sqlserver::SqlServerVendor),
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
