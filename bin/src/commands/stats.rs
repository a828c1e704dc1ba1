//! Stats command implementation.

use crate::commands::open_store;
use crate::display::Format;
use crate::settings::{Settings, SettingsError};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use dayroll_lib::prelude::*;
use std::io::{BufWriter, Write as _};

/// Execute the stats command.
pub(crate) async fn stats(
    settings: &Settings,
    start: NaiveDate,
    end: NaiveDate,
    format: Format,
) -> Result<()> {
    if settings.symbols.is_empty() {
        return Err(SettingsError::NoSymbols.into());
    }
    let range = DateRange::new(start, end)?;

    let store = open_store(settings).await?;
    let stats = store
        .statistics(&settings.symbols, range)
        .await
        .context("Failed to compute statistics")?;
    store.close().await;

    if stats.is_empty() {
        eprintln!("No committed aggregates between {start} and {end}.");
        return Ok(());
    }

    let mut out = BufWriter::new(std::io::stdout());
    OutputFormat::from(format).write_statistics(&stats, &mut out)?;
    out.flush()?;
    Ok(())
}
