//! Ingest command implementation.
//!
//! Runs the ingestion pipeline over every configured symbol, shows progress,
//! prints a per-symbol summary and optionally writes the run report.

use crate::commands::open_store;
use crate::display::run_summary;
use crate::settings::Settings;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use dayroll_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Execute the ingest command.
pub(crate) async fn ingest(
    settings: &Settings,
    run_date: NaiveDate,
    report_path: Option<PathBuf>,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    settings.validate_for_ingest()?;
    let api_key = settings.api_key().context("No API key configured")?;

    let client = DownloadClient::new(ClientConfig {
        timeout: settings.source_timeout(),
        max_retries: settings.source.max_retries,
        ..Default::default()
    })
    .context("Failed to create HTTP client")?;
    let source = AlphaVantageSource::new(
        client,
        AlphaVantageConfig::new(api_key).with_endpoint(settings.source.endpoint.clone()),
    );

    let committed = Arc::new(open_store(settings).await?);
    let store: Arc<dyn RecordStore> = if dry_run {
        info!("dry run: aggregates will not be written");
        Arc::new(DryRunStore::new(Arc::clone(&committed)))
    } else {
        committed.clone()
    };

    let cancel = CancelFlag::new();
    let pipeline = IngestionPipeline::new(Arc::new(source), store, settings.pipeline_config())
        .with_cancel_flag(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing symbols in progress");
            cancel.cancel();
        }
    });

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(pipeline.config().symbols.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} symbols {msg}")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb
    };

    let report = pipeline
        .run_with_progress(run_date, |outcome| {
            progress.set_message(format!("{} {}", outcome.symbol, outcome.status));
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();
    ctrl_c.abort();
    committed.close().await;

    if !quiet {
        if dry_run {
            println!("Dry run: nothing was written.");
        }
        print!("{}", run_summary(&report));
    }

    if let Some(path) = report_path {
        let json = report.to_json().context("Failed to serialize run report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write run report {}", path.display()))?;
        info!(path = %path.display(), "wrote run report");
    }

    if report.has_failures() {
        bail!(
            "{} out of {} symbols failed",
            report.count(SymbolStatus::Failed),
            report.outcomes.len()
        );
    }

    Ok(())
}

/// Reads watermarks from the database but stages appends in memory.
struct DryRunStore {
    committed: Arc<SqliteRecordStore>,
    staged: MemoryRecordStore,
}

impl DryRunStore {
    fn new(committed: Arc<SqliteRecordStore>) -> Self {
        Self {
            committed,
            staged: MemoryRecordStore::new(),
        }
    }
}

#[async_trait]
impl RecordStore for DryRunStore {
    async fn max_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError> {
        let committed = self.committed.max_date(symbol).await?;
        let staged = self.staged.max_date(symbol).await?;
        Ok(committed.max(staged))
    }

    async fn append(&self, aggregate: &DailyAggregate) -> Result<(), StoreError> {
        if self
            .committed
            .max_date(&aggregate.symbol)
            .await?
            .is_some_and(|watermark| aggregate.date <= watermark)
        {
            return Err(StoreError::Duplicate {
                symbol: aggregate.symbol.clone(),
                date: aggregate.date,
            });
        }
        self.staged.append(aggregate).await
    }
}
