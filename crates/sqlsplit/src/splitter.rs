//! Statement boundary scanner.
//!
//! The splitter walks a script once, front to back, and cuts it into
//! [`Statement`]s. It tracks just enough lexical state to avoid false
//! boundaries:
//!
//! ```text
//!            ' or "        --           /*          $tag$
//!   Code ──────► Quote ──► Line ──────► Block ───► Dollar
//!     ▲            │ ' "     │ \n         │ */        │ $tag$
//!     └────────────┴─────────┴────────────┴───────────┘
//! ```
//!
//! Delimiters and end markers are only recognized in `Code`. At the first
//! significant token of each unit the vendor decides whether the unit is a
//! procedural block; if so it runs until the vendor's block-end marker
//! instead of the next delimiter.
//!
//! Doubled quotes (`'it''s'`) keep a literal open for every vendor. A
//! backslash escapes the next character only for vendors that enable it, and
//! inside `E'...'` escape strings.
//!
//! ## Directives
//!
//! 1. End-marker lines: a line holding only the vendor's line token (`/`
//!    for Oracle, `GO` for SQL Server). They close the pending unit,
//!    procedural or not, and are skipped when nothing is pending. Vendors
//!    that end blocks at the active delimiter have no end-marker line.
//! 2. `DELIMITER <token>` (vendors that support it), recognized where a
//!    statement would start, whether or not that is the start of a line.
//!    The rest of the line is consumed and the active delimiter changes
//!    for the rest of the script.
//!
//! The directive is checked before procedural classification, so a
//! `DELIMITER //` line is never itself emitted as a block.
//!
//! A statement whose last content is a `--` comment keeps the newline that
//! ends the comment, so appending a delimiter to its text never lands the
//! delimiter inside the comment.

use tracing::{debug, trace};

use crate::error::{Location, SplitError};
use crate::statement::{ParsedScript, Statement, StatementKind};
use crate::vendors::{BlockEnd, VendorClassifier};

/// Splits scripts for one vendor.
///
/// A `Splitter` holds no scan state of its own; every call to
/// [`Splitter::split`] starts fresh, so one splitter may be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct Splitter<'v> {
    vendor: &'v dyn VendorClassifier,
}

impl<'v> Splitter<'v> {
    /// Create a splitter for `vendor`.
    #[must_use]
    pub fn new(vendor: &'v dyn VendorClassifier) -> Self {
        Self { vendor }
    }

    /// Split a whole script.
    ///
    /// An unterminated final statement is accepted and emitted.
    ///
    /// # Errors
    ///
    /// Returns a `SplitError` if the script ends inside a quoted literal,
    /// dollar-quoted body or block comment. No statements are returned in
    /// that case.
    pub fn split(&self, text: &str) -> Result<ParsedScript, SplitError> {
        match self.split_partial(text) {
            (script, None) => Ok(script),
            (_, Some(error)) => Err(error),
        }
    }

    /// Split a script, keeping every unit completed before a failure.
    ///
    /// The unit that was open when the scan failed is discarded.
    #[must_use]
    pub fn split_partial(&self, text: &str) -> (ParsedScript, Option<SplitError>) {
        let (statements, error) = Scan::new(self.vendor, text).run();
        debug!(
            vendor = self.vendor.name(),
            statements = statements.len(),
            failed = error.is_some(),
            "Split script"
        );
        (ParsedScript::new(statements), error)
    }
}

/// Split `text` with `vendor`; shorthand for `Splitter::new(vendor).split(text)`.
///
/// # Errors
///
/// See [`Splitter::split`].
pub fn split(text: &str, vendor: &dyn VendorClassifier) -> Result<ParsedScript, SplitError> {
    Splitter::new(vendor).split(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode<'a> {
    Code,
    Quote { quote: u8, backslash: bool },
    LineComment,
    BlockComment,
    DollarQuote(&'a str),
}

/// Per-call scan state.
struct Scan<'a> {
    vendor: &'a dyn VendorClassifier,
    text: &'a str,
    pos: usize,
    delimiter: String,
    block_end: BlockEnd<'a>,
    dollar_quoting: bool,
    delimiter_directive: bool,
    backslash_escapes: bool,
    mode: Mode<'a>,
    mode_start: usize,
    buffer: String,
    significant: bool,
    procedural: bool,
    /// The last non-whitespace content of the unit is a `--` comment
    comment_tail: bool,
    statements: Vec<Statement>,
}

impl<'a> Scan<'a> {
    fn new(vendor: &'a dyn VendorClassifier, text: &'a str) -> Self {
        Self {
            vendor,
            text,
            pos: 0,
            delimiter: vendor.default_delimiter().to_string(),
            block_end: vendor.block_end(),
            dollar_quoting: vendor.supports_dollar_quoting(),
            delimiter_directive: vendor.supports_delimiter_directive(),
            backslash_escapes: vendor.supports_backslash_escapes(),
            mode: Mode::Code,
            mode_start: 0,
            buffer: String::new(),
            significant: false,
            procedural: false,
            comment_tail: false,
            statements: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Statement>, Option<SplitError>) {
        while self.pos < self.text.len() {
            if self.mode == Mode::Code && self.at_line_start() && self.end_marker_line() {
                continue;
            }
            match self.mode {
                Mode::Code => self.step_code(),
                Mode::Quote { quote, backslash } => self.step_quote(quote, backslash),
                Mode::LineComment => {
                    if self.rest().starts_with('\n') {
                        self.mode = Mode::Code;
                    }
                    self.take_char();
                }
                Mode::BlockComment => self.step_until("*/"),
                Mode::DollarQuote(tag) => self.step_until(tag),
            }
        }
        let error = self.finish();
        (self.statements, error)
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.text.as_bytes()[self.pos - 1] == b'\n'
    }

    /// The rest of the current line, and the offset just past it.
    fn current_line(&self) -> (&'a str, usize) {
        let rest = self.rest();
        match rest.find('\n') {
            Some(nl) => (&rest[..nl], self.pos + nl + 1),
            None => (rest, self.text.len()),
        }
    }

    /// Move `len` bytes from the input into the buffer.
    fn take(&mut self, len: usize) {
        let end = self.pos + len;
        self.buffer.push_str(&self.text[self.pos..end]);
        self.pos = end;
    }

    fn take_char(&mut self) {
        let len = self.rest().chars().next().map_or(1, char::len_utf8);
        self.take(len);
    }

    fn enter(&mut self, mode: Mode<'a>, opener_len: usize) {
        self.mode = mode;
        self.mode_start = self.pos;
        self.take(opener_len);
    }

    /// Close the pending unit on an end-marker line. Returns `true` if the
    /// line was consumed.
    fn end_marker_line(&mut self) -> bool {
        let BlockEnd::Line(token) = self.block_end else {
            return false;
        };
        let (line, next) = self.current_line();
        let trimmed = line.trim();
        if !trimmed.eq_ignore_ascii_case(token) {
            return false;
        }
        trace!(marker = trimmed, "End marker line");
        self.close_unit();
        self.pos = next;
        true
    }

    /// Consume a `DELIMITER <token>` directive at the current position.
    fn consume_delimiter_directive(&mut self) -> bool {
        let (line, next) = self.current_line();
        let Some(delimiter) = parse_delimiter_directive(line) else {
            return false;
        };
        debug!(from = %self.delimiter, to = delimiter, "Delimiter redefined");
        self.delimiter = delimiter.to_string();
        self.pos = next;
        true
    }

    fn step_code(&mut self) {
        let rest = self.rest();
        let is_comment = rest.starts_with("--") || rest.starts_with("/*");
        let is_whitespace = rest.starts_with(char::is_whitespace);
        let at_delimiter = rest.starts_with(self.delimiter.as_str());

        if !self.significant && !is_comment && !is_whitespace && !at_delimiter {
            if self.delimiter_directive && self.consume_delimiter_directive() {
                return;
            }
            self.significant = true;
            self.procedural = self.vendor.is_procedural_start(rest);
        }

        if !is_whitespace && !(at_delimiter && self.delimiter_ends_unit()) {
            self.comment_tail = rest.starts_with("--");
        }

        if rest.starts_with("--") {
            self.enter(Mode::LineComment, 2);
        } else if rest.starts_with("/*") {
            self.enter(Mode::BlockComment, 2);
        } else if rest.starts_with('\'') {
            let backslash = self.backslash_escapes || self.after_escape_prefix();
            self.enter(Mode::Quote { quote: b'\'', backslash }, 1);
        } else if rest.starts_with('"') {
            let backslash = self.backslash_escapes;
            self.enter(Mode::Quote { quote: b'"', backslash }, 1);
        } else if let Some(tag) = self.dollar_tag(rest) {
            self.enter(Mode::DollarQuote(tag), tag.len());
        } else if at_delimiter && self.delimiter_ends_unit() {
            self.pos += self.delimiter.len();
            self.close_unit();
        } else {
            self.take_char();
        }
    }

    fn delimiter_ends_unit(&self) -> bool {
        !self.procedural || self.block_end == BlockEnd::ActiveDelimiter
    }

    /// Is the quote at the current position the start of an `E'...'`
    /// escape string?
    fn after_escape_prefix(&self) -> bool {
        let before = &self.text[..self.pos];
        let Some(prefix) = before.strip_suffix(['E', 'e']) else {
            return false;
        };
        !prefix
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    /// Recognize a `$$` or `$tag$` opener at the start of `rest`.
    fn dollar_tag(&self, rest: &'a str) -> Option<&'a str> {
        if !self.dollar_quoting || !rest.starts_with('$') {
            return None;
        }
        let body = &rest[1..];
        let tag_len = body
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(body.len());
        if body[tag_len..].starts_with('$')
            && !body.starts_with(|c: char| c.is_ascii_digit())
        {
            Some(&rest[..tag_len + 2])
        } else {
            None
        }
    }

    fn step_quote(&mut self, quote: u8, backslash: bool) {
        let byte = self.text.as_bytes()[self.pos];
        if backslash && byte == b'\\' {
            self.take(1);
            if self.pos < self.text.len() {
                self.take_char();
            }
        } else if byte == quote {
            self.take(1);
            self.mode = Mode::Code;
        } else {
            self.take_char();
        }
    }

    fn step_until(&mut self, closer: &str) {
        if self.rest().starts_with(closer) {
            self.take(closer.len());
            self.mode = Mode::Code;
        } else {
            self.take_char();
        }
    }

    /// Emit the pending unit, if it holds anything but comments and
    /// whitespace, and reset for the next one.
    fn close_unit(&mut self) {
        if self.significant {
            let kind = if self.procedural {
                StatementKind::Procedural
            } else {
                StatementKind::Regular
            };
            let mut text = self.buffer.trim().to_string();
            if self.comment_tail {
                text.push('\n');
            }
            if let Some(statement) = Statement::from_text(kind, text) {
                trace!(kind = %kind, len = statement.text().len(), "Statement closed");
                self.statements.push(statement);
            }
        }
        self.buffer.clear();
        self.significant = false;
        self.procedural = false;
        self.comment_tail = false;
    }

    fn finish(&mut self) -> Option<SplitError> {
        let (text, start) = (self.text, self.mode_start);
        let location = move || Location::of(text, start);
        match self.mode {
            Mode::Code | Mode::LineComment => {
                self.close_unit();
                None
            }
            Mode::Quote { quote, .. } => Some(SplitError::UnterminatedQuote {
                quote: char::from(quote).to_string(),
                location: location(),
            }),
            Mode::DollarQuote(tag) => Some(SplitError::UnterminatedQuote {
                quote: tag.to_string(),
                location: location(),
            }),
            Mode::BlockComment => Some(SplitError::UnterminatedComment {
                location: location(),
            }),
        }
    }
}

/// Parse a `DELIMITER <token>` line, returning the new delimiter.
fn parse_delimiter_directive(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    if !keyword.eq_ignore_ascii_case("DELIMITER") {
        return None;
    }
    words.next()
}
