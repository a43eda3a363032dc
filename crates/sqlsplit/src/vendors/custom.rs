//! Data-driven vendors defined in configuration.
//!
//! A custom vendor describes its procedural starts as keyword patterns:
//!
//! ```text
//! CREATE [OR REPLACE] FUNCTION|PROCEDURE
//! ```
//!
//! Words are matched case-insensitively and whole-word. `A|B` accepts either
//! alternative, and a bracketed run of words is optional as a group.

use serde::{Deserialize, Serialize};

use super::tokens::Tokens;
use super::{BlockEnd, VendorClassifier};
use crate::error::{Error, Result};

/// Block terminator as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockEndSpec {
    /// A line holding only `/`
    #[default]
    Slash,
    /// The delimiter active when the block closes
    ActiveDelimiter,
    /// A line holding only the given token
    Line(String),
}

/// Configuration entry for a custom vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomVendorConfig {
    /// Registry name
    pub name: String,

    /// Statement delimiter at the start of a script
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Procedural block terminator: `slash`, `active-delimiter` or `{ line: TOKEN }`
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub block_end: BlockEndSpec,

    /// Keyword patterns that open a procedural block
    #[serde(default)]
    pub procedural_starts: Vec<String>,

    /// Honour `DELIMITER <token>` lines
    #[serde(default)]
    pub delimiter_directive: bool,

    /// Treat `$tag$ ... $tag$` as opaque literals
    #[serde(default)]
    pub dollar_quoting: bool,

    /// Treat `\` as an escape inside quoted literals
    #[serde(default)]
    pub backslash_escapes: bool,

    /// Default server port, informational
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_delimiter() -> String {
    ";".to_string()
}

/// One step of a keyword pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// One of several alternative words
    Word(Vec<String>),
    /// Optional group of steps
    Optional(Vec<Vec<String>>),
}

/// Compiled keyword pattern such as `CREATE [OR REPLACE] FUNCTION|PROCEDURE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPattern {
    source: String,
    steps: Vec<Step>,
}

impl KeywordPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty pattern or unbalanced brackets.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |why: &str| Error::Config(format!("invalid keyword pattern '{source}': {why}"));
        let mut steps = Vec::new();
        let mut group: Option<Vec<Vec<String>>> = None;

        for raw in source.split_whitespace() {
            let mut word = raw;
            let opens = word.starts_with('[');
            if opens {
                if group.is_some() {
                    return Err(invalid("nested optional group"));
                }
                group = Some(Vec::new());
                word = &word[1..];
            }
            let closes = word.ends_with(']');
            if closes {
                word = &word[..word.len() - 1];
            }
            if word.contains(['[', ']']) {
                return Err(invalid("nested optional group"));
            }
            let alternatives: Vec<String> = word
                .split('|')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            if alternatives.is_empty() {
                return Err(invalid("empty word"));
            }
            match group.as_mut() {
                Some(words) => words.push(alternatives),
                None => steps.push(Step::Word(alternatives)),
            }
            if closes {
                let words = group.take().ok_or_else(|| invalid("unmatched ']'"))?;
                steps.push(Step::Optional(words));
            }
        }

        if group.is_some() {
            return Err(invalid("unclosed '['"));
        }
        if !steps.iter().any(|s| matches!(s, Step::Word(_))) {
            return Err(invalid("pattern needs at least one required word"));
        }
        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does `text` start with this pattern?
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let mut t = Tokens::new(text);
        for step in &self.steps {
            match step {
                Step::Word(alternatives) => {
                    if !alternatives.iter().any(|w| t.token(w)) {
                        return false;
                    }
                }
                Step::Optional(words) => {
                    let saved = t;
                    if !words.iter().all(|alts| alts.iter().any(|w| t.token(w))) {
                        t = saved;
                    }
                }
            }
        }
        true
    }
}

/// Vendor assembled from a `CustomVendorConfig`.
#[derive(Debug, Clone)]
pub struct CustomVendor {
    name: String,
    delimiter: String,
    block_end: BlockEndSpec,
    patterns: Vec<KeywordPattern>,
    delimiter_directive: bool,
    dollar_quoting: bool,
    backslash_escapes: bool,
    port: Option<u16>,
}

impl CustomVendor {
    /// Build a vendor from its configuration entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a blank name or delimiter, or an invalid
    /// keyword pattern.
    pub fn from_config(config: &CustomVendorConfig) -> Result<Self> {
        let name = config.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::Config("custom vendor name must not be empty".to_string()));
        }
        let delimiter = config.delimiter.trim();
        if delimiter.is_empty() {
            return Err(Error::Config(format!(
                "vendor '{name}': delimiter must not be empty"
            )));
        }
        if let BlockEndSpec::Line(token) = &config.block_end
            && token.trim().is_empty()
        {
            return Err(Error::Config(format!(
                "vendor '{name}': block-end line token must not be empty"
            )));
        }
        let patterns = config
            .procedural_starts
            .iter()
            .map(|p| KeywordPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            delimiter: delimiter.to_string(),
            block_end: config.block_end.clone(),
            patterns,
            delimiter_directive: config.delimiter_directive,
            dollar_quoting: config.dollar_quoting,
            backslash_escapes: config.backslash_escapes,
            port: config.port,
        })
    }

    /// Patterns that open a procedural block.
    #[must_use]
    pub fn patterns(&self) -> &[KeywordPattern] {
        &self.patterns
    }
}

impl VendorClassifier for CustomVendor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(text))
    }

    fn default_delimiter(&self) -> &str {
        &self.delimiter
    }

    fn block_end(&self) -> BlockEnd<'_> {
        match &self.block_end {
            BlockEndSpec::Slash => BlockEnd::Line("/"),
            BlockEndSpec::ActiveDelimiter => BlockEnd::ActiveDelimiter,
            BlockEndSpec::Line(token) => BlockEnd::Line(token.trim()),
        }
    }

    fn supports_delimiter_directive(&self) -> bool {
        self.delimiter_directive
    }

    fn supports_dollar_quoting(&self) -> bool {
        self.dollar_quoting
    }

    fn supports_backslash_escapes(&self) -> bool {
        self.backslash_escapes
    }

    fn default_port(&self) -> Option<u16> {
        self.port
    }
}
