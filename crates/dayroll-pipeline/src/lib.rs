//! Incremental daily ingestion pipeline for the dayroll daily quote aggregator.
//!
//! For each configured symbol the [`IngestionPipeline`] resolves the
//! watermark, fetches quotes, drops anything outside the lookback window or
//! already committed, reduces the rest into daily aggregates and appends
//! them in emission order. Symbols run concurrently and fail independently;
//! the result of a run is a [`RunReport`].

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod pipeline;
mod report;
mod watermark;

pub use config::PipelineConfig;
pub use error::{FailureKind, SymbolError};
pub use pipeline::{CancelFlag, IngestionPipeline};
pub use report::{RunId, RunReport, SymbolOutcome, SymbolStatus, SymbolSummary};
pub use watermark::WatermarkResolver;
