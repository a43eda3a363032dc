//! Name → classifier lookup table.
//!
//! A registry is assembled once at start-up: the four built-in vendors,
//! plus anything registered through [`VendorRegistry::register`] (for
//! example custom vendors from configuration). Registration needs
//! `&mut self`, so once the registry is shared by reference or behind an
//! `Arc` it is read-only and lookups need no locking.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::vendors::{CustomVendor, CustomVendorConfig, Vendor, VendorClassifier};

static BUILTIN: LazyLock<VendorRegistry> = LazyLock::new(VendorRegistry::with_builtins);

/// Registered vendors keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct VendorRegistry {
    vendors: HashMap<String, Arc<dyn VendorClassifier>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl VendorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in vendors.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for vendor in Vendor::ALL {
            registry
                .vendors
                .insert(vendor.as_str().to_string(), vendor.shared());
        }
        registry
    }

    /// The process-wide registry of built-in vendors.
    #[must_use]
    pub fn builtin() -> &'static VendorRegistry {
        &BUILTIN
    }

    /// Register a vendor under `name`, replacing any previous entry.
    ///
    /// Returns the classifier that was replaced, if any.
    pub fn register(
        &mut self,
        name: &str,
        classifier: Arc<dyn VendorClassifier>,
    ) -> Option<Arc<dyn VendorClassifier>> {
        let key = normalize(name);
        debug!(vendor = %key, "Registering database vendor");
        self.vendors.insert(key, classifier)
    }

    /// Build and register every custom vendor from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any entry is invalid; nothing is
    /// registered in that case.
    pub fn register_custom(&mut self, configs: &[CustomVendorConfig]) -> Result<()> {
        let built = configs
            .iter()
            .map(CustomVendor::from_config)
            .collect::<Result<Vec<_>>>()?;
        for vendor in built {
            let name = vendor.name().to_string();
            self.register(&name, Arc::new(vendor));
        }
        Ok(())
    }

    /// Look up a vendor by name (case-insensitive, whitespace-trimmed).
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedVendor` for an unknown or blank name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn VendorClassifier>> {
        self.vendors
            .get(&normalize(name))
            .cloned()
            .ok_or_else(|| Error::UnsupportedVendor {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Returns `true` if `name` resolves to a vendor.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vendors.contains_key(&normalize(name))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vendors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered vendors, sorted by name.
    #[must_use]
    pub fn vendors(&self) -> Vec<(String, Arc<dyn VendorClassifier>)> {
        let mut entries: Vec<_> = self
            .vendors
            .iter()
            .map(|(name, v)| (name.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of registered vendors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    /// Returns `true` if no vendors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}
