//! Output format abstraction.

use dayroll_types::{DailyAggregate, SymbolStatistics};
use std::io::Write;
use thiserror::Error;

use crate::{CsvFormatter, JsonFormatter};

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// CSV format.
    #[default]
    Csv,
    /// JSON array format.
    Json,
    /// Newline-delimited JSON format.
    Ndjson,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Json, Self::Ndjson]
    }

    /// Writes aggregates with this format's default formatter.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_aggregates<W: Write + Send>(
        &self,
        aggregates: &[DailyAggregate],
        writer: W,
    ) -> Result<(), FormatError> {
        match self {
            Self::Csv => CsvFormatter::new().write_aggregates(aggregates, writer),
            Self::Json => JsonFormatter::new().with_pretty(true).write_aggregates(aggregates, writer),
            Self::Ndjson => JsonFormatter::ndjson().write_aggregates(aggregates, writer),
        }
    }

    /// Writes statistics with this format's default formatter.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_statistics<W: Write + Send>(
        &self,
        stats: &[SymbolStatistics],
        writer: W,
    ) -> Result<(), FormatError> {
        match self {
            Self::Csv => CsvFormatter::new().write_statistics(stats, writer),
            Self::Json => JsonFormatter::new().with_pretty(true).write_statistics(stats, writer),
            Self::Ndjson => JsonFormatter::ndjson().write_statistics(stats, writer),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes daily aggregates to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_aggregates<W: Write + Send>(
        &self,
        aggregates: &[DailyAggregate],
        writer: W,
    ) -> Result<(), FormatError>;

    /// Writes per-symbol statistics to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_statistics<W: Write + Send>(
        &self,
        stats: &[SymbolStatistics],
        writer: W,
    ) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}
