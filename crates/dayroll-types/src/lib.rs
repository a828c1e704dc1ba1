//! Core types for the dayroll daily quote aggregator.
//!
//! This crate provides the data structures and ports shared by every other
//! dayroll crate:
//!
//! - [`Symbol`] - Validated ticker symbol
//! - [`Quote`] - One intraday price/volume sample
//! - [`DailyAggregate`] - Committed open/close/volume summary for one day
//! - [`DateRange`] - Inclusive range of dates
//! - [`QuoteSource`] / [`RecordStore`] - Ports to the quote vendor and the store
//! - [`AggregateQuery`] / [`Page`] / [`SymbolStatistics`] - Read-side types

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregate;
mod date_range;
mod error;
mod money;
mod ports;
mod query;
mod quote;
mod symbol;

pub use aggregate::DailyAggregate;
pub use date_range::DateRange;
pub use error::{
    DateRangeError, MalformedQuote, OrderingViolation, ReduceError, SourceError, StoreError,
    SymbolParseError, VolumeOverflow,
};
pub use money::{MONEY_SCALE, round_money};
pub use ports::{QuoteBatch, QuoteSource, RecordStore};
pub use query::{AggregateQuery, DEFAULT_PAGE_LIMIT, Page, SymbolStatistics};
pub use quote::Quote;
pub use symbol::Symbol;
