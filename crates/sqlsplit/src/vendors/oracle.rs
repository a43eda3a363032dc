//! Oracle PL/SQL classification.
//!
//! Anonymous blocks (`DECLARE`, `BEGIN`) and stored program units are
//! procedural. They end at a line holding only `/`, the SQL*Plus convention.

use super::tokens::Tokens;
use super::{BlockEnd, VendorClassifier};

/// Oracle database vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleVendor;

impl VendorClassifier for OracleVendor {
    fn name(&self) -> &str {
        "oracle"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        let mut t = Tokens::new(text);
        if t.any(&["DECLARE", "BEGIN"]) {
            return true;
        }
        if !t.token("CREATE") {
            return false;
        }
        t.optional(&["OR", "REPLACE"]);
        t.optional(&["EDITIONABLE"]);
        t.optional(&["NONEDITIONABLE"]);
        t.any(&["FUNCTION", "PROCEDURE", "PACKAGE", "TRIGGER"])
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::Line("/")
    }

    fn default_port(&self) -> Option<u16> {
        Some(1521)
    }
}
