//! Statement units produced by the splitter.
//!
//! A script splits into an ordered list of [`Statement`]s. Each statement is
//! exactly one of two kinds:
//!
//! | Kind | Terminated by | Example |
//! |------|---------------|---------|
//! | `Regular` | the active delimiter (`;` by default) | `SELECT 1` |
//! | `Procedural` | the vendor's block-end marker | `BEGIN NULL; END;` |
//!
//! The terminator itself is never part of the stored text.

use serde::{Deserialize, Serialize};

/// Coarse kind of a statement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Plain SQL ended by the statement delimiter
    Regular,
    /// Procedure, function, trigger or anonymous block
    Procedural,
}

impl StatementKind {
    /// Lowercase name used in CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Procedural => "procedural",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently executable fragment of a SQL script.
///
/// The text is trimmed and never empty. Consumers that execute statements
/// should match on both variants; procedural blocks are usually sent to the
/// database as a single call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Statement {
    /// SQL terminated by the active delimiter, delimiter stripped.
    Regular {
        /// Statement text
        text: String,
    },
    /// Multi-statement body terminated by a vendor-specific end marker.
    Procedural {
        /// Block text, end marker stripped
        text: String,
    },
}

impl Statement {
    /// Build a statement of the given kind.
    ///
    /// Returns `None` when `text` is empty after trimming.
    #[must_use]
    pub fn new(kind: StatementKind, text: &str) -> Option<Self> {
        Self::from_text(kind, text.trim().to_string())
    }

    /// Build a statement from text that is already trimmed.
    pub(crate) fn from_text(kind: StatementKind, text: String) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(match kind {
            StatementKind::Regular => Self::Regular { text },
            StatementKind::Procedural => Self::Procedural { text },
        })
    }

    /// The statement text without its terminator.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Regular { text } | Self::Procedural { text } => text,
        }
    }

    /// The statement kind tag.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Regular { .. } => StatementKind::Regular,
            Self::Procedural { .. } => StatementKind::Procedural,
        }
    }

    /// Returns `true` for procedural blocks.
    #[must_use]
    pub fn is_procedural(&self) -> bool {
        matches!(self, Self::Procedural { .. })
    }

    /// Consume the statement, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Regular { text } | Self::Procedural { text } => text,
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Ordered statements of one script, in textual order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedScript {
    statements: Vec<Statement>,
}

impl ParsedScript {
    /// Wrap an already ordered list of statements.
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Statements in source order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if the script held no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterate over the statements.
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Statements paired with their 1-based position in the script.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Statement)> {
        self.statements.iter().enumerate().map(|(i, s)| (i + 1, s))
    }

    /// Number of procedural blocks in the script.
    #[must_use]
    pub fn procedural_count(&self) -> usize {
        self.statements.iter().filter(|s| s.is_procedural()).count()
    }

    /// Consume the script, returning the statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl<'a> IntoIterator for &'a ParsedScript {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl IntoIterator for ParsedScript {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_and_rejects_blank_text() {
        assert_eq!(Statement::new(StatementKind::Regular, "  \n\t "), None);

        let stmt = Statement::new(StatementKind::Regular, "\n SELECT 1 \n").expect("non-empty");
        assert_eq!(stmt.text(), "SELECT 1");
        assert_eq!(stmt.kind(), StatementKind::Regular);
    }

    #[test]
    fn kind_tag_matches_variant() {
        let block = Statement::new(StatementKind::Procedural, "BEGIN NULL; END;").expect("non-empty");
        assert!(block.is_procedural());
        assert_eq!(block.kind(), StatementKind::Procedural);
        assert_eq!(block.into_text(), "BEGIN NULL; END;");
    }

    #[test]
    fn statement_serializes_with_kind_tag() {
        let stmt = Statement::Regular {
            text: "SELECT 1".to_string(),
        };
        let json = serde_json::to_string(&stmt).expect("serialize");
        assert_eq!(json, r#"{"kind":"regular","text":"SELECT 1"}"#);
    }

    #[test]
    fn numbered_starts_at_one() {
        let script = ParsedScript::new(vec![
            Statement::Regular {
                text: "SELECT 1".to_string(),
            },
            Statement::Procedural {
                text: "BEGIN NULL; END;".to_string(),
            },
        ]);

        let numbers: Vec<usize> = script.numbered().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(script.procedural_count(), 1);
    }
}
