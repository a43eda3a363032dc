//! MySQL stored program classification.
//!
//! MySQL clients redefine the statement delimiter with `DELIMITER <token>`
//! around stored programs, so a procedural block ends at whatever delimiter
//! is active when it closes. The `DELIMITER` lines themselves are consumed
//! by the splitter and never reach the classifier.

use super::tokens::Tokens;
use super::{BlockEnd, VendorClassifier};

/// MySQL database vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlVendor;

impl VendorClassifier for MySqlVendor {
    fn name(&self) -> &str {
        "mysql"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        let mut t = Tokens::new(text);
        if !t.token("CREATE") {
            return false;
        }
        if t.token("DEFINER") && !(t.token("=") && t.word().is_some()) {
            return false;
        }
        t.any(&["PROCEDURE", "FUNCTION", "TRIGGER"])
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::ActiveDelimiter
    }

    fn supports_delimiter_directive(&self) -> bool {
        true
    }

    fn supports_backslash_escapes(&self) -> bool {
        true
    }

    fn default_port(&self) -> Option<u16> {
        Some(3306)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::procedure("CREATE PROCEDURE p() BEGIN SELECT 1; END")]
    #[case::function("create function f() returns int return 1")]
    #[case::definer_procedure("CREATE DEFINER=`root`@`localhost` PROCEDURE p() BEGIN END")]
    #[case::definer_spaced("CREATE DEFINER = CURRENT_USER FUNCTION f() RETURNS INT RETURN 1")]
    #[case::trigger("CREATE TRIGGER t BEFORE INSERT ON x FOR EACH ROW SET NEW.a = 1")]
    fn recognizes_stored_programs(#[case] sql: &str) {
        assert!(MySqlVendor.is_procedural_start(sql));
    }

    #[rstest]
    #[case::select("SELECT 1")]
    #[case::delimiter_directive("DELIMITER //")]
    #[case::create_table("CREATE TABLE t (id INT)")]
    #[case::definer_view("CREATE DEFINER=`root`@`%` VIEW v AS SELECT 1")]
    #[case::begin("BEGIN")]
    fn leaves_plain_sql_alone(#[case] sql: &str) {
        assert!(!MySqlVendor.is_procedural_start(sql));
    }
}
