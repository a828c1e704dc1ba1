//! Error types for dayroll.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::Symbol;

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}

/// Error for symbols that fail validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolParseError {
    /// Empty or whitespace-only symbol.
    #[error("Symbol is empty")]
    Empty,

    /// Symbol longer than [`Symbol::MAX_LEN`].
    #[error("Symbol '{0}' exceeds {max} characters", max = Symbol::MAX_LEN)]
    TooLong(String),

    /// Symbol contains a character outside `[A-Za-z0-9.-]`.
    #[error("Symbol '{symbol}' contains invalid character '{found}'")]
    InvalidChar {
        /// The offending symbol.
        symbol: String,
        /// The first invalid character.
        found: char,
    },
}

/// A vendor record that could not be turned into a [`Quote`](crate::Quote).
///
/// Malformed records are skipped individually; they never abort a symbol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed quote for {symbol} at '{key}': {reason}")]
pub struct MalformedQuote {
    /// Symbol the record was fetched for.
    pub symbol: Symbol,
    /// The record's key in the vendor payload (usually its timestamp).
    pub key: String,
    /// What was wrong with the record.
    pub reason: String,
}

impl MalformedQuote {
    /// Creates a new malformed quote report.
    pub fn new(symbol: Symbol, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            symbol,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// A quote that breaks the strictly-descending timestamp precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Quote for {symbol} at {offending} is not earlier than preceding quote at {previous}")]
pub struct OrderingViolation {
    /// Symbol being reduced.
    pub symbol: Symbol,
    /// Timestamp of the last quote absorbed before the violation.
    pub previous: NaiveDateTime,
    /// Timestamp of the out-of-order quote.
    pub offending: NaiveDateTime,
}

/// A day whose summed volume does not fit in a `u64`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Volume for {symbol} on {date} overflows")]
pub struct VolumeOverflow {
    /// Symbol being reduced.
    pub symbol: Symbol,
    /// Day whose volume overflowed.
    pub date: NaiveDate,
}

/// Why daily reduction stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// Quotes were not strictly descending.
    #[error(transparent)]
    Ordering(#[from] OrderingViolation),

    /// A day's volume could not be summed exactly.
    #[error(transparent)]
    VolumeOverflow(#[from] VolumeOverflow),
}

/// Errors returned by a [`QuoteSource`](crate::QuoteSource).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server returned a non-success status after all retries.
    #[error("Server error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Vendor answered with an error payload (bad symbol, bad key, rate limit).
    #[error("Quote API error: {0}")]
    Api(String),

    /// Payload could not be understood at all.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors returned by a [`RecordStore`](crate::RecordStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An aggregate for this symbol and date is already committed.
    #[error("Aggregate for {symbol} on {date} already exists")]
    Duplicate {
        /// The symbol.
        symbol: Symbol,
        /// The already-committed date.
        date: NaiveDate,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be decoded.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Query parameters were rejected.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
