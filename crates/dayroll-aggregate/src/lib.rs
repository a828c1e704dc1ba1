//! Daily quote reduction for the dayroll daily quote aggregator.
//!
//! This crate turns a descending stream of intraday quotes into daily
//! aggregates:
//!
//! - [`LookbackWindow`] / [`filter_lookback`] - Drop quotes older than the trailing window
//! - [`exclude_committed`] - Drop quotes at or before a symbol's watermark
//! - [`DayGroup`] - The in-progress state of one day
//! - [`DailyReducer`] / [`reduce_daily`] - Streaming group-by-day reduction
//! - [`summarize`] - Average daily figures over committed aggregates

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod filter;
mod group;
mod reducer;
mod statistics;

pub use filter::{LookbackWindow, exclude_committed, filter_lookback};
pub use group::{DayGroup, Step};
pub use reducer::{DailyAggregates, DailyReducer, reduce_daily};
pub use statistics::summarize;
