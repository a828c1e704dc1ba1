//! CLI command implementations.

pub(crate) mod ingest;
pub(crate) mod query;
pub(crate) mod stats;
pub(crate) mod watermark;

use crate::settings::Settings;
use anyhow::{Context, Result};
use dayroll_lib::SqliteRecordStore;

/// Opens the configured database.
pub(crate) async fn open_store(settings: &Settings) -> Result<SqliteRecordStore> {
    let path = settings.database_path()?;
    SqliteRecordStore::open(&path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))
}
