//! `sqlsplit.yaml` configuration.
//!
//! ```yaml
//! vendor: postgresql
//! max-concurrency: 8
//! timeout-secs: 30
//! vendors:
//!   - name: h2
//!     block-end: slash
//!     procedural-starts: ["CREATE ALIAS"]
//! ```
//!
//! Every key is optional. Command-line flags take precedence over these values.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parallel::ParseOptions;
use crate::registry::VendorRegistry;
use crate::vendors::{CustomVendorConfig, Vendor};

/// Name of the configuration file looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "sqlsplit.yaml";

/// Vendor used when neither the command line nor the config names one.
pub const DEFAULT_VENDOR: Vendor = Vendor::Oracle;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Default vendor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Maximum number of files split at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Deadline for a whole run, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Additional vendors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendors: Vec<CustomVendorConfig>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), vendors = config.vendors.len(), "Loaded configuration");
        Ok(config)
    }

    /// Load `sqlsplit.yaml` from `dir` if it exists, or return the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for a file that exists but is unreadable or
    /// malformed.
    pub async fn discover_in(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if fs::try_exists(&path).await? {
            Self::load(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load `sqlsplit.yaml` from the current directory if it exists.
    ///
    /// # Errors
    ///
    /// See [`Config::discover_in`].
    pub async fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::discover_in(&cwd).await
    }

    /// Built-in vendors plus the ones defined here.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any custom vendor entry is invalid.
    pub fn registry(&self) -> Result<VendorRegistry> {
        let mut registry = VendorRegistry::with_builtins();
        registry.register_custom(&self.vendors)?;
        Ok(registry)
    }

    /// The vendor name to use, after applying a command-line override.
    #[must_use]
    pub fn vendor_or<'a>(&'a self, cli: Option<&'a str>) -> &'a str {
        cli.or(self.vendor.as_deref())
            .unwrap_or(DEFAULT_VENDOR.as_str())
    }

    /// Parse options after applying command-line overrides.
    #[must_use]
    pub fn parse_options(
        &self,
        max_concurrency: Option<NonZeroUsize>,
        timeout_secs: Option<u64>,
    ) -> ParseOptions {
        ParseOptions {
            max_concurrency: max_concurrency.or(self.max_concurrency),
            deadline: timeout_secs
                .or(self.timeout_secs)
                .map(Duration::from_secs),
        }
    }
}
