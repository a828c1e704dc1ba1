//! Query command implementation.
//!
//! Lists committed daily aggregates one page at a time, newest first.

use crate::commands::open_store;
use crate::display::{Format, page_footer};
use crate::settings::Settings;
use anyhow::{Context, Result};
use dayroll_lib::prelude::*;
use std::io::{BufWriter, Write as _};

/// Execute the query command.
pub(crate) async fn query(
    settings: &Settings,
    query: &AggregateQuery,
    format: Format,
    quiet: bool,
) -> Result<()> {
    let store = open_store(settings).await?;
    let page = store.query(query).await.context("Query failed")?;
    store.close().await;

    let mut out = BufWriter::new(std::io::stdout());
    OutputFormat::from(format).write_aggregates(&page.items, &mut out)?;
    out.flush()?;

    if !quiet {
        eprintln!("{}", page_footer(&page));
    }
    Ok(())
}
