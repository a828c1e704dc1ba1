//! Intraday quote fetching for the dayroll daily quote aggregator.
//!
//! This crate provides the quote download pipeline:
//!
//! - [`url::intraday_url`] - Constructs Alpha Vantage intraday URLs
//! - [`DownloadClient`] - HTTP client with connection pooling and retries
//! - [`parse_intraday`] - Intraday JSON parsing into a [`QuoteBatch`](dayroll_types::QuoteBatch)
//! - [`AlphaVantageSource`] - [`QuoteSource`](dayroll_types::QuoteSource) backed by Alpha Vantage

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod parse;
mod source;
pub mod url;

pub use client::{ClientConfig, DownloadClient, DownloadError};
pub use parse::parse_intraday;
pub use source::{AlphaVantageConfig, AlphaVantageSource};
