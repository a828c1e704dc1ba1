//! Ticker symbol definitions.

use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::SymbolParseError;

/// A validated ticker symbol (e.g., "IBM", "BRK.B").
///
/// Symbols are stored upper-cased and are at most [`Symbol::MAX_LEN`]
/// characters of ASCII letters, digits, `.` or `-`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Maximum symbol length, matching the store's column width.
    pub const MAX_LEN: usize = 10;

    /// Parses and normalizes a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, too long, or contains
    /// characters other than ASCII letters, digits, `.` or `-`.
    pub fn new(raw: &str) -> Result<Self, SymbolParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolParseError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(SymbolParseError::TooLong(trimmed.to_string()));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(SymbolParseError::InvalidChar {
                symbol: trimmed.to_string(),
                found: c,
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
