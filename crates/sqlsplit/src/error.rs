//! Error types for sqlsplit operations.
//!
//! Errors come in three layers:
//!
//! - **`SplitError`**: malformed script input, reported by the splitter with
//!   the location where the unterminated construct opened
//! - **`FileError`**: a per-file failure captured by the concurrent parser;
//!   collected into the aggregate, never thrown across task boundaries
//! - **`Error`**: top-level failures that stop a request before any file is
//!   scanned (unknown vendor, unreadable configuration)
//!
//! `FileErrorKind` uses a 4xx/5xx style categorization:
//! - Input problems (user's fault): unterminated literals, bad encoding
//! - Internal problems (our fault): I/O errors, worker panics

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for sqlsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for sqlsplit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Vendor name not present in the registry
    #[error("unsupported database vendor: '{name}' (known: {})", known.join(", "))]
    UnsupportedVendor {
        /// The name as supplied by the caller
        name: String,
        /// Registered vendor names, sorted
        known: Vec<String>,
    },

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

/// Position inside a script.
///
/// `offset` is a byte offset; `line` and `column` are 1-indexed, with the
/// column counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Byte offset from the start of the script
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl Location {
    /// Compute the location of a byte offset within `text`.
    ///
    /// `offset` must lie on a char boundary.
    #[must_use]
    pub fn of(text: &str, offset: usize) -> Self {
        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
        let line = before.matches('\n').count() + 1;
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Malformed script input.
///
/// Raised when the scan reaches end of input while still inside a literal
/// or block comment; the trailing structure cannot be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// A quoted literal or identifier was never closed
    #[error("unterminated {quote} quote opened at {location}")]
    UnterminatedQuote {
        /// The opening quote sequence (`'`, `"` or a `$tag$`)
        quote: String,
        /// Where the literal opened
        location: Location,
    },

    /// A `/* ... */` comment was never closed
    #[error("unterminated block comment opened at {location}")]
    UnterminatedComment {
        /// Where the comment opened
        location: Location,
    },
}

impl SplitError {
    /// Location of the construct that was left open.
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Self::UnterminatedQuote { location, .. } | Self::UnterminatedComment { location } => {
                *location
            }
        }
    }
}

/// Error encountered while parsing one file of a batch.
///
/// Stored in the aggregate next to the successful results; one failing
/// file never affects its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    /// Identifier of the job that failed
    pub id: String,
    /// Category of the error
    pub kind: FileErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Location in the script, when the failure is tied to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.id, self.message, self.kind)
    }
}

impl std::error::Error for FileError {}

/// Categorization of per-file errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// Script ended inside a literal or comment
    SplitFailed,

    /// File content is not valid UTF-8
    EncodingError,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// Could not read the file from disk
    IoError,

    /// The worker task panicked
    WorkerPanicked,
}

impl std::fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SplitFailed => write!(f, "split failed"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
            Self::WorkerPanicked => write!(f, "worker panicked"),
        }
    }
}

impl FileErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::SplitFailed | Self::EncodingError)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::IoError | Self::WorkerPanicked)
    }
}

impl FileError {
    /// Create a new per-file error.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Wrap a split failure for a file.
    #[must_use]
    pub fn split_failed(id: impl Into<String>, error: &SplitError) -> Self {
        Self {
            location: Some(error.location()),
            ..Self::new(id, FileErrorKind::SplitFailed, error.to_string())
        }
    }

    /// Create an I/O error for a file.
    ///
    /// `InvalidData` from a UTF-8 read is reported as an encoding error.
    #[must_use]
    pub fn io_error(id: impl Into<String>, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::InvalidData {
            Self::new(id, FileErrorKind::EncodingError, "file is not valid UTF-8")
        } else {
            Self::new(id, FileErrorKind::IoError, error.to_string())
        }
    }

    /// Create an error for a worker that panicked or was cancelled.
    #[must_use]
    pub fn worker_panicked(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, FileErrorKind::WorkerPanicked, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_kind_categorization() {
        // Input errors (4xx-style)
        assert!(FileErrorKind::SplitFailed.is_input_error());
        assert!(FileErrorKind::EncodingError.is_input_error());
        assert!(!FileErrorKind::SplitFailed.is_internal_error());

        // Internal errors (5xx-style)
        assert!(FileErrorKind::IoError.is_internal_error());
        assert!(FileErrorKind::WorkerPanicked.is_internal_error());
        assert!(!FileErrorKind::IoError.is_input_error());
    }

    #[test]
    fn location_counts_lines_and_columns_from_one() {
        let text = "SELECT 1;\nSELECT 'x";
        let loc = Location::of(text, 17);

        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 8);
        assert_eq!(loc.offset, 17);
    }

    #[test]
    fn location_columns_count_characters_not_bytes() {
        let text = "SELECT 'é', 'x";
        let offset = text.rfind('\'').expect("quote present");
        let loc = Location::of(text, offset);

        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 13);
    }

    #[test]
    fn file_error_display_includes_id_and_kind() {
        let split = SplitError::UnterminatedComment {
            location: Location {
                offset: 0,
                line: 3,
                column: 1,
            },
        };
        let error = FileError::split_failed("schema.sql", &split);

        let display = error.to_string();
        assert!(display.contains("schema.sql"));
        assert!(display.contains("line 3"));
        assert!(display.contains("split failed"));
        assert_eq!(error.location.map(|l| l.line), Some(3));
    }

    #[test]
    fn invalid_data_maps_to_encoding_error() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert_eq!(FileError::io_error("a.sql", &io).kind, FileErrorKind::EncodingError);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(FileError::io_error("a.sql", &io).kind, FileErrorKind::IoError);
    }

    #[test]
    fn unsupported_vendor_lists_known_names() {
        let error = Error::UnsupportedVendor {
            name: "db2".to_string(),
            known: vec!["mysql".to_string(), "oracle".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "unsupported database vendor: 'db2' (known: mysql, oracle)"
        );
    }
}
