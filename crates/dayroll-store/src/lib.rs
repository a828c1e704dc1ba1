//! Durable daily aggregate storage for the dayroll daily quote aggregator.
//!
//! Two [`RecordStore`](dayroll_types::RecordStore) implementations:
//!
//! - [`SqliteRecordStore`] - SQLite database via `sqlx`, used by the CLI
//! - [`MemoryRecordStore`] - in-process map for tests and dry runs
//!
//! Both also serve the read side: paginated [`query`](SqliteRecordStore::query)
//! and per-symbol [`statistics`](SqliteRecordStore::statistics).

#![doc(issue_tracker_base_url = "https://github.com/dayroll/dayroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod memory;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
