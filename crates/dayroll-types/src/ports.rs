//! Ports to the quote vendor and the aggregate store.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{DailyAggregate, MalformedQuote, Quote, SourceError, StoreError, Symbol};

/// The quotes fetched for one symbol in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteBatch {
    /// The symbol the batch was fetched for.
    pub symbol: Symbol,
    /// Well-formed quotes, most recent first.
    pub quotes: Vec<Quote>,
    /// Records that were skipped because they could not be parsed.
    pub malformed: Vec<MalformedQuote>,
}

impl QuoteBatch {
    /// Creates a batch with no malformed records.
    #[must_use]
    pub const fn new(symbol: Symbol, quotes: Vec<Quote>) -> Self {
        Self {
            symbol,
            quotes,
            malformed: Vec::new(),
        }
    }

    /// Creates a batch carrying the records skipped while parsing.
    #[must_use]
    pub const fn with_malformed(
        symbol: Symbol,
        quotes: Vec<Quote>,
        malformed: Vec<MalformedQuote>,
    ) -> Self {
        Self {
            symbol,
            quotes,
            malformed,
        }
    }

    /// Returns true if the batch holds no well-formed quotes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Returns the number of well-formed quotes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Returns true if any record was skipped as malformed.
    #[must_use]
    pub const fn had_errors(&self) -> bool {
        !self.malformed.is_empty()
    }
}

/// Retrieves intraday quotes for a symbol.
///
/// Implementations must return quotes in strictly descending timestamp
/// order; daily reduction relies on it to find day boundaries.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches every available quote for the symbol.
    ///
    /// # Errors
    ///
    /// Returns an error on transport, authentication or vendor failure.
    async fn fetch(&self, symbol: &Symbol) -> Result<QuoteBatch, SourceError>;
}

/// Durable, append-only storage of daily aggregates.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the latest committed date for the symbol, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn max_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError>;

    /// Appends one aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if an aggregate for the same symbol
    /// and date already exists, or another error if the write fails.
    async fn append(&self, aggregate: &DailyAggregate) -> Result<(), StoreError>;
}
