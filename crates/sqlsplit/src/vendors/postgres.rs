//! PostgreSQL PL/pgSQL classification.
//!
//! Function bodies are dollar-quoted, so the splitter can keep using the
//! ordinary delimiter to end them; the classifier only tags the unit.

use super::tokens::Tokens;
use super::{BlockEnd, VendorClassifier};

/// PostgreSQL database vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresVendor;

impl VendorClassifier for PostgresVendor {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        let mut t = Tokens::new(text);
        if t.token("DO") {
            return t.peek() == Some('$') || t.token("LANGUAGE");
        }
        if !t.token("CREATE") {
            return false;
        }
        t.optional(&["OR", "REPLACE"]);
        t.optional(&["CONSTRAINT"]);
        t.any(&["FUNCTION", "PROCEDURE", "TRIGGER"])
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::ActiveDelimiter
    }

    fn supports_dollar_quoting(&self) -> bool {
        true
    }

    fn default_port(&self) -> Option<u16> {
        Some(5432)
    }
}
