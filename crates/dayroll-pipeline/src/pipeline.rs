//! Per-symbol ingestion orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, Utc};
use dayroll_aggregate::{exclude_committed, filter_lookback, reduce_daily};
use dayroll_types::{QuoteSource, RecordStore, ReduceError, Symbol};
use futures::stream::{self, StreamExt};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::unique_symbols;
use crate::{
    PipelineConfig, RunReport, SymbolError, SymbolOutcome, SymbolStatus, SymbolSummary,
    WatermarkResolver,
};

/// Shared flag that stops a run from starting further symbols.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Symbols already in progress finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetches, reduces and commits daily aggregates for configured symbols.
#[derive(Clone)]
pub struct IngestionPipeline {
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn RecordStore>,
    watermarks: WatermarkResolver,
    config: Arc<PipelineConfig>,
    cancel: CancelFlag,
}

impl IngestionPipeline {
    /// Creates a pipeline over the given source and store.
    #[must_use]
    pub fn new(
        source: Arc<dyn QuoteSource>,
        store: Arc<dyn RecordStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            watermarks: WatermarkResolver::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
            cancel: CancelFlag::new(),
        }
    }

    /// Uses an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the cancellation flag.
    #[must_use]
    pub const fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingests one symbol.
    ///
    /// Resolves the watermark, fetches quotes, drops those outside the
    /// lookback window or on/before the watermark, reduces the rest and
    /// appends each aggregate in emission order.
    ///
    /// # Errors
    ///
    /// Returns a [`SymbolError`] describing where ingestion stopped.
    /// Aggregates appended before the error stay committed.
    pub async fn ingest_symbol(
        &self,
        symbol: &Symbol,
        run_date: NaiveDate,
    ) -> Result<SymbolSummary, SymbolError> {
        let watermark = self
            .watermarks
            .resolve(symbol)
            .await
            .map_err(SymbolError::WatermarkResolution)?;

        let batch = self
            .source
            .fetch(symbol)
            .await
            .map_err(SymbolError::SourceUnavailable)?;

        let mut summary = SymbolSummary::new(symbol.clone(), watermark);
        summary.fetched = batch.len();
        summary.malformed = batch.malformed.len();
        for skipped in &batch.malformed {
            warn!(%symbol, key = %skipped.key, reason = %skipped.reason, "skipping malformed quote");
        }

        let in_window: Vec<_> =
            filter_lookback(batch.quotes, self.config.lookback, run_date).collect();
        summary.outside_lookback = summary.fetched - in_window.len();

        let fresh: Vec<_> = exclude_committed(in_window, watermark).collect();
        summary.already_committed = summary.fetched - summary.outside_lookback - fresh.len();

        debug!(
            %symbol,
            fetched = summary.fetched,
            outside_lookback = summary.outside_lookback,
            already_committed = summary.already_committed,
            "filtered quotes"
        );

        for aggregate in reduce_daily(fresh) {
            let aggregate = aggregate.map_err(|err| match err {
                ReduceError::Ordering(source) => SymbolError::OrderingViolation {
                    source,
                    committed: summary.committed,
                },
                ReduceError::VolumeOverflow(source) => SymbolError::VolumeOverflow {
                    source,
                    committed: summary.committed,
                },
            })?;
            self.store
                .append(&aggregate)
                .await
                .map_err(|source| SymbolError::StoreWrite {
                    source,
                    committed: summary.committed,
                })?;
            debug!(%symbol, date = %aggregate.date, volume = aggregate.volume, "committed daily aggregate");
            summary.record(&aggregate);
        }

        Ok(summary)
    }

    /// Ingests every configured symbol.
    pub async fn run(&self, run_date: NaiveDate) -> RunReport {
        self.run_with_progress(run_date, |_| {}).await
    }

    /// Ingests every configured symbol, calling `on_outcome` as each
    /// symbol finishes.
    ///
    /// Symbols run concurrently, at most
    /// [`PipelineConfig::parallel_symbols`] at a time, each in its own task.
    /// A panic inside one symbol is reported as that symbol's failure.
    /// Symbols not yet started when the cancel flag is set are reported as
    /// cancelled.
    pub async fn run_with_progress<F>(&self, run_date: NaiveDate, on_outcome: F) -> RunReport
    where
        F: Fn(&SymbolOutcome) + Send + Sync,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        // `symbols` is a public field and may have gained repeats after `new`.
        let symbols = unique_symbols(self.config.symbols.iter().cloned());
        info!(%run_id, %run_date, symbols = symbols.len(), lookback = %self.config.lookback, "starting ingestion run");
        let on_outcome = &on_outcome;
        let mut outcomes: Vec<(usize, SymbolOutcome)> =
            stream::iter(symbols.into_iter().enumerate())
                .map(|(index, symbol)| async move {
                    let outcome = self.run_symbol(symbol, run_date).await;
                    on_outcome(&outcome);
                    (index, outcome)
                })
                .buffer_unordered(self.config.parallel_symbols.max(1))
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let report = RunReport {
            run_id,
            run_date,
            started_at,
            completed_at: Utc::now(),
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        };
        info!(
            %run_id,
            committed = report.total_committed(),
            failed = report.count(SymbolStatus::Failed),
            cancelled = report.count(SymbolStatus::Cancelled),
            "ingestion run finished"
        );
        report
    }

    async fn run_symbol(&self, symbol: Symbol, run_date: NaiveDate) -> SymbolOutcome {
        if self.cancel.is_cancelled() {
            info!(%symbol, "skipping symbol, run cancelled");
            return SymbolOutcome::cancelled(symbol);
        }

        let pipeline = self.clone();
        let task_symbol = symbol.clone();
        let result = tokio::spawn(async move { pipeline.ingest_symbol(&task_symbol, run_date).await })
            .await
            .unwrap_or_else(|e| Err(SymbolError::Panicked(join_error_message(e))));

        match &result {
            Ok(summary) => info!(
                %symbol,
                committed = summary.committed,
                malformed = summary.malformed,
                watermark = ?summary.watermark,
                "symbol ingested"
            ),
            Err(e) => error!(%symbol, kind = %e.kind(), error = %e, "symbol failed"),
        }
        SymbolOutcome::from_result(symbol, &result)
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

fn join_error_message(e: JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    let payload = e.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dayroll_aggregate::LookbackWindow;
    use dayroll_store::{MemoryRecordStore, SqliteRecordStore};
    use dayroll_types::{
        DailyAggregate, MalformedQuote, Quote, QuoteBatch, SourceError, StoreError,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use crate::FailureKind;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn quote(symbol: &str, day: u32, hour: u32, open: Decimal, close: Decimal, volume: u64) -> Quote {
        Quote::new(
            sym(symbol),
            date(day).and_hms_opt(hour, 0, 0).unwrap(),
            open,
            close,
            volume,
        )
    }

    fn reference_quotes(symbol: &str) -> Vec<Quote> {
        vec![
            quote(symbol, 3, 10, dec!(101), dec!(105), 50),
            quote(symbol, 3, 9, dec!(100), dec!(105), 30),
            quote(symbol, 2, 15, dec!(98), dec!(99), 40),
        ]
    }

    /// Serves canned batches; unknown symbols fail.
    #[derive(Default)]
    struct FakeSource {
        batches: HashMap<Symbol, Result<QuoteBatch, SourceError>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_quotes(mut self, symbol: &str, quotes: Vec<Quote>) -> Self {
            self.batches
                .insert(sym(symbol), Ok(QuoteBatch::new(sym(symbol), quotes)));
            self
        }

        fn with_batch(mut self, batch: QuoteBatch) -> Self {
            self.batches.insert(batch.symbol.clone(), Ok(batch));
            self
        }

        fn with_error(mut self, symbol: &str, error: SourceError) -> Self {
            self.batches.insert(sym(symbol), Err(error));
            self
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch(&self, symbol: &Symbol) -> Result<QuoteBatch, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol.as_str() == "BOOM" {
                panic!("source exploded");
            }
            self.batches
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| Err(SourceError::Api(format!("unknown symbol {symbol}"))))
        }
    }

    /// Wraps a store and fails appends after `allowed` successes.
    struct FlakyStore {
        inner: Arc<MemoryRecordStore>,
        allowed: usize,
        appended: AtomicUsize,
        fail_reads: bool,
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn max_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Database("read timeout".into()));
            }
            self.inner.max_date(symbol).await
        }

        async fn append(&self, aggregate: &DailyAggregate) -> Result<(), StoreError> {
            if self.appended.fetch_add(1, Ordering::SeqCst) >= self.allowed {
                return Err(StoreError::Database("disk full".into()));
            }
            self.inner.append(aggregate).await
        }
    }

    fn pipeline(
        source: FakeSource,
        store: Arc<dyn RecordStore>,
        symbols: &[&str],
        lookback_days: u32,
    ) -> IngestionPipeline {
        let config = PipelineConfig::new(symbols.iter().map(|s| sym(s)).collect())
            .with_lookback(LookbackWindow::days(lookback_days));
        IngestionPipeline::new(Arc::new(source), store, config)
    }

    #[tokio::test]
    async fn test_reference_example_end_to_end() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        let pipeline = pipeline(source, store.clone(), &["IBM"], 30);

        let summary = pipeline.ingest_symbol(&sym("IBM"), date(10)).await.unwrap();
        assert_eq!(summary.committed, 2);
        assert_eq!(summary.first_date, Some(date(2)));
        assert_eq!(summary.last_date, Some(date(3)));

        let rows = store.aggregates().await;
        assert_eq!(
            rows,
            vec![
                DailyAggregate::new(sym("IBM"), date(2), dec!(98), dec!(99), 40),
                DailyAggregate::new(sym("IBM"), date(3), dec!(100), dec!(105), 80),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default()
            .with_quotes("IBM", reference_quotes("IBM"))
            .with_quotes("AAPL", reference_quotes("AAPL"));
        let pipeline = pipeline(source, store.clone(), &["IBM", "AAPL"], 30);

        let first = pipeline.run(date(10)).await;
        assert_eq!(first.total_committed(), 4);
        assert!(!first.has_failures());

        let second = pipeline.run(date(10)).await;
        assert_eq!(second.total_committed(), 0);
        assert!(!second.has_failures());
        assert_eq!(second.count(SymbolStatus::Succeeded), 2);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_watermark_day_is_not_recommitted() {
        let store = Arc::new(MemoryRecordStore::new());
        store
            .append(&DailyAggregate::new(sym("IBM"), date(2), dec!(1), dec!(1), 1))
            .await
            .unwrap();
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        let pipeline = pipeline(source, store.clone(), &["IBM"], 30);

        let summary = pipeline.ingest_symbol(&sym("IBM"), date(10)).await.unwrap();
        assert_eq!(summary.watermark, Some(date(2)));
        assert_eq!(summary.already_committed, 1);
        assert_eq!(summary.committed, 1);

        let rows = store.aggregates().await;
        assert_eq!(rows[0].volume, 1);
        assert_eq!(rows[1].date, date(3));
    }

    #[tokio::test]
    async fn test_lookback_enforced_without_watermark() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        // Run on Jan 10 with a 7-day window: cutoff Jan 3 keeps only Jan 3.
        let pipeline = pipeline(source, store.clone(), &["IBM"], 7);

        let summary = pipeline.ingest_symbol(&sym("IBM"), date(10)).await.unwrap();
        assert_eq!(summary.outside_lookback, 1);
        assert_eq!(summary.committed, 1);
        assert_eq!(store.max_date(&sym("IBM")).await.unwrap(), Some(date(3)));
        assert!(store.aggregates().await.iter().all(|a| a.date != date(2)));
    }

    #[tokio::test]
    async fn test_source_failure_is_isolated() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default()
            .with_error("MSFT", SourceError::Status { status: 503 })
            .with_quotes("IBM", reference_quotes("IBM"));
        let pipeline = pipeline(source, store.clone(), &["MSFT", "IBM"], 30);

        let report = pipeline.run(date(10)).await;
        assert!(report.has_failures());

        let msft = report.outcome(&sym("MSFT")).unwrap();
        assert_eq!(msft.status, SymbolStatus::Failed);
        assert_eq!(msft.failure, Some(FailureKind::SourceUnavailable));

        let ibm = report.outcome(&sym("IBM")).unwrap();
        assert_eq!(ibm.status, SymbolStatus::Succeeded);
        assert_eq!(ibm.committed, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_ordering_violation_keeps_earlier_commits() {
        let store = Arc::new(MemoryRecordStore::new());
        let quotes = vec![
            quote("IBM", 5, 10, dec!(1), dec!(1), 1),
            quote("IBM", 4, 10, dec!(1), dec!(1), 1),
            quote("IBM", 6, 10, dec!(1), dec!(1), 1),
        ];
        let source = FakeSource::default().with_quotes("IBM", quotes);
        let pipeline = pipeline(source, store.clone(), &["IBM"], 30);

        let err = pipeline
            .ingest_symbol(&sym("IBM"), date(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::OrderingViolation);
        assert_eq!(err.committed(), 1);
        assert_eq!(store.max_date(&sym("IBM")).await.unwrap(), Some(date(5)));
    }

    #[tokio::test]
    async fn test_store_failure_resumes_next_run() {
        let inner = Arc::new(MemoryRecordStore::new());
        let quotes = vec![
            quote("IBM", 5, 10, dec!(1), dec!(1), 1),
            quote("IBM", 4, 10, dec!(1), dec!(1), 1),
            quote("IBM", 3, 10, dec!(1), dec!(1), 1),
        ];
        let flaky = Arc::new(FlakyStore {
            inner: inner.clone(),
            allowed: 1,
            appended: AtomicUsize::new(0),
            fail_reads: false,
        });
        let source = FakeSource::default().with_quotes("IBM", quotes.clone());
        let failing = pipeline(source, flaky, &["IBM"], 30);

        let err = failing
            .ingest_symbol(&sym("IBM"), date(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::StoreWrite);
        assert_eq!(err.committed(), 1);
        assert_eq!(inner.len().await, 1);

        // Day 5 is committed, so the healthy rerun resumes below it and
        // commits nothing newer than the watermark.
        let source = FakeSource::default().with_quotes("IBM", quotes);
        let healthy = pipeline(source, inner.clone(), &["IBM"], 30);
        let summary = healthy.ingest_symbol(&sym("IBM"), date(10)).await.unwrap();
        assert_eq!(summary.watermark, Some(date(5)));
        assert_eq!(summary.committed, 0);
        assert_eq!(inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_watermark_failure_is_fatal() {
        let flaky = Arc::new(FlakyStore {
            inner: Arc::new(MemoryRecordStore::new()),
            allowed: usize::MAX,
            appended: AtomicUsize::new(0),
            fail_reads: true,
        });
        let source = Arc::new(FakeSource::default().with_quotes("IBM", reference_quotes("IBM")));
        let pipeline = IngestionPipeline::new(
            source.clone(),
            flaky,
            PipelineConfig::new(vec![sym("IBM")]),
        );

        let err = pipeline
            .ingest_symbol(&sym("IBM"), date(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::WatermarkResolution);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_quotes_are_counted() {
        let store = Arc::new(MemoryRecordStore::new());
        let batch = QuoteBatch::with_malformed(
            sym("IBM"),
            reference_quotes("IBM"),
            vec![MalformedQuote::new(sym("IBM"), "2024-01-03 11:00:00", "bad volume")],
        );
        let source = FakeSource::default().with_batch(batch);
        let pipeline = pipeline(source, store, &["IBM"], 30);

        let report = pipeline.run(date(10)).await;
        let outcome = report.outcome(&sym("IBM")).unwrap();
        assert_eq!(outcome.status, SymbolStatus::Succeeded);
        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.committed, 2);
    }

    #[tokio::test]
    async fn test_panic_is_captured_per_symbol() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        let pipeline = pipeline(source, store, &["BOOM", "IBM"], 30);

        let report = pipeline.run(date(10)).await;
        let boom = report.outcome(&sym("BOOM")).unwrap();
        assert_eq!(boom.failure, Some(FailureKind::Panicked));
        assert!(boom.error.as_deref().unwrap().contains("source exploded"));
        assert_eq!(
            report.outcome(&sym("IBM")).unwrap().status,
            SymbolStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn test_cancelled_run_starts_nothing() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = Arc::new(
            FakeSource::default()
                .with_quotes("IBM", reference_quotes("IBM"))
                .with_quotes("AAPL", reference_quotes("AAPL")),
        );
        let cancel = CancelFlag::new();
        let pipeline = IngestionPipeline::new(
            source.clone(),
            store.clone(),
            PipelineConfig::new(vec![sym("IBM"), sym("AAPL")]),
        )
        .with_cancel_flag(cancel.clone());

        cancel.cancel();
        let report = pipeline.run(date(10)).await;

        assert_eq!(report.count(SymbolStatus::Cancelled), 2);
        assert!(!report.has_failures());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_outcomes_follow_configuration_order() {
        let store = Arc::new(MemoryRecordStore::new());
        let source = FakeSource::default()
            .with_quotes("C", reference_quotes("C"))
            .with_quotes("A", reference_quotes("A"))
            .with_quotes("B", reference_quotes("B"));
        let pipeline = pipeline(source, store, &["C", "A", "B"], 30);

        let seen = std::sync::Mutex::new(Vec::new());
        let report = pipeline
            .run_with_progress(date(10), |o| seen.lock().unwrap().push(o.symbol.clone()))
            .await;

        let order: Vec<_> = report.outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_symbol_is_ingested_once() {
        let store = Arc::new(SqliteRecordStore::in_memory().await.unwrap());
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        let pipeline = pipeline(source, store.clone(), &["IBM", "ibm"], 30);
        assert_eq!(pipeline.config().symbols, vec![sym("IBM")]);

        let report = pipeline.run(date(10)).await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(!report.has_failures());
        assert_eq!(report.total_committed(), 2);
        assert_eq!(store.max_date(&sym("IBM")).await.unwrap(), Some(date(3)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeats_added_after_construction_are_ignored() {
        let store = Arc::new(SqliteRecordStore::in_memory().await.unwrap());
        let source = FakeSource::default().with_quotes("IBM", reference_quotes("IBM"));
        let mut config =
            PipelineConfig::new(vec![sym("IBM")]).with_lookback(LookbackWindow::days(30));
        config.symbols.push(sym("ibm"));
        let pipeline = IngestionPipeline::new(Arc::new(source), store, config);

        let report = pipeline.run(date(10)).await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_volume_overflow_fails_symbol() {
        let store = Arc::new(MemoryRecordStore::new());
        let quotes = vec![
            quote("IBM", 4, 10, dec!(1), dec!(1), 10),
            quote("IBM", 3, 10, dec!(1), dec!(1), u64::MAX),
            quote("IBM", 3, 9, dec!(1), dec!(1), 1),
        ];
        let source = FakeSource::default().with_quotes("IBM", quotes);
        let pipeline = pipeline(source, store.clone(), &["IBM"], 30);

        let err = pipeline.ingest_symbol(&sym("IBM"), date(10)).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::VolumeOverflow);
        assert_eq!(err.committed(), 1);
        assert_eq!(store.max_date(&sym("IBM")).await.unwrap(), Some(date(4)));
    }
}
