//! Keyword cursor used by the procedural-start classifiers.
//!
//! Matching is case-insensitive and whole-word: `BEGIN` matches `begin` but
//! not `BEGIN_DATE`. Every successful match consumes leading whitespace and
//! the token; a failed match leaves the cursor untouched.

/// Characters that continue an identifier-like word.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

/// Forward-only cursor over the start of a statement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Consume `token` if the input continues with it.
    pub(crate) fn token(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        let len = token.len();
        let Some(head) = self.rest.get(..len) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(token) {
            return false;
        }
        let ends_in_word = token.chars().next_back().is_some_and(is_word_char);
        if ends_in_word && self.rest[len..].chars().next().is_some_and(is_word_char) {
            return false;
        }
        self.rest = &self.rest[len..];
        true
    }

    /// Consume the first of `tokens` that matches.
    pub(crate) fn any(&mut self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.token(t))
    }

    /// Consume every token of `sequence`, or nothing at all.
    pub(crate) fn sequence(&mut self, sequence: &[&str]) -> bool {
        let saved = *self;
        if sequence.iter().all(|t| self.token(t)) {
            true
        } else {
            *self = saved;
            false
        }
    }

    /// Consume `sequence` if present; never fails.
    pub(crate) fn optional(&mut self, sequence: &[&str]) {
        self.sequence(sequence);
    }

    /// Consume the next run of non-whitespace characters.
    pub(crate) fn word(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(word)
    }

    /// Next non-whitespace character, without consuming it.
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest.trim_start().chars().next()
    }
}
