//! SQL Server T-SQL classification.
//!
//! Programmable objects must be the only statement in their batch, so a
//! procedural block runs until the next `GO` line.

use super::tokens::Tokens;
use super::{BlockEnd, VendorClassifier};

const OBJECT_KINDS: &[&str] = &["PROCEDURE", "PROC", "TRIGGER", "FUNCTION"];

/// SQL Server database vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerVendor;

impl VendorClassifier for SqlServerVendor {
    fn name(&self) -> &str {
        "sqlserver"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        let mut t = Tokens::new(text);
        if t.token("CREATE") {
            t.optional(&["OR", "ALTER"]);
        } else if !t.token("ALTER") {
            return false;
        }
        t.any(OBJECT_KINDS)
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::Line("GO")
    }

    fn default_port(&self) -> Option<u16> {
        Some(1433)
    }
}
