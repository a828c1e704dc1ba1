//! Incremental daily open/close/volume aggregation of intraday quotes.
//!
//! This is a facade crate that re-exports functionality from the dayroll
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use dayroll_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DownloadClient::with_defaults()?;
//!     let source = AlphaVantageSource::new(client, AlphaVantageConfig::new("demo"));
//!     let store = SqliteRecordStore::open("dayroll.db").await?;
//!
//!     let config = PipelineConfig::new(vec![Symbol::new("IBM")?]);
//!     let pipeline = IngestionPipeline::new(Arc::new(source), Arc::new(store), config);
//!
//!     let report = pipeline.run(chrono::Utc::now().date_naive()).await;
//!     println!("Committed {} daily aggregates", report.total_committed());
//!
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use dayroll_types::*;

// Re-export reduction and filtering
pub use dayroll_aggregate::{
    DailyAggregates, DailyReducer, DayGroup, LookbackWindow, Step, exclude_committed,
    filter_lookback, reduce_daily, summarize,
};

// Re-export the quote source
#[cfg(feature = "fetch")]
pub use dayroll_fetch::{
    AlphaVantageConfig, AlphaVantageSource, ClientConfig, DownloadClient, DownloadError,
    parse_intraday, url,
};

// Re-export stores
#[cfg(feature = "store")]
pub use dayroll_store::{MemoryRecordStore, SqliteRecordStore};

// Re-export formatters
#[cfg(feature = "format")]
pub use dayroll_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat};

// Re-export the pipeline
#[cfg(feature = "pipeline")]
pub use dayroll_pipeline::{
    CancelFlag, FailureKind, IngestionPipeline, PipelineConfig, RunId, RunReport, SymbolError,
    SymbolOutcome, SymbolStatus, SymbolSummary, WatermarkResolver,
};

/// Prelude module for convenient imports.
///
/// ```
/// use dayroll_lib::prelude::*;
/// ```
pub mod prelude {
    pub use dayroll_types::{
        AggregateQuery, DailyAggregate, DateRange, DateRangeError, Page, Quote, QuoteBatch,
        QuoteSource, RecordStore, SourceError, StoreError, Symbol, SymbolStatistics,
    };

    pub use dayroll_aggregate::{LookbackWindow, reduce_daily};

    #[cfg(feature = "fetch")]
    pub use dayroll_fetch::{AlphaVantageConfig, AlphaVantageSource, ClientConfig, DownloadClient};

    #[cfg(feature = "store")]
    pub use dayroll_store::{MemoryRecordStore, SqliteRecordStore};

    #[cfg(feature = "format")]
    pub use dayroll_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "pipeline")]
    pub use dayroll_pipeline::{
        CancelFlag, IngestionPipeline, PipelineConfig, RunReport, SymbolOutcome, SymbolStatus,
    };
}
