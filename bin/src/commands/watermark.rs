//! Watermark command implementation.

use crate::commands::open_store;
use crate::settings::Settings;
use anyhow::{Context, Result};
use dayroll_lib::WatermarkResolver;
use dayroll_lib::prelude::*;
use std::sync::Arc;

/// Print the latest committed date for a symbol.
pub(crate) async fn watermark(settings: &Settings, symbol: &Symbol) -> Result<()> {
    let store = Arc::new(open_store(settings).await?);
    let resolver = WatermarkResolver::new(store.clone());

    let watermark = resolver
        .resolve(symbol)
        .await
        .with_context(|| format!("Failed to resolve watermark for {symbol}"))?;
    store.close().await;

    match watermark {
        Some(date) => println!("{symbol}: {date}"),
        None => println!("{symbol}: no committed aggregates"),
    }
    Ok(())
}
