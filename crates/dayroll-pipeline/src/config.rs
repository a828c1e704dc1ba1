//! Pipeline configuration.

use std::collections::HashSet;

use dayroll_aggregate::LookbackWindow;
use dayroll_types::Symbol;

/// What a run ingests and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Symbols ingested by [`IngestionPipeline::run`](crate::IngestionPipeline::run).
    ///
    /// Treated as a set: a run ingests each symbol once, in first-seen order.
    pub symbols: Vec<Symbol>,
    /// Quotes older than this window are ignored.
    pub lookback: LookbackWindow,
    /// Maximum number of symbols processed at once.
    pub parallel_symbols: usize,
}

impl PipelineConfig {
    /// Default number of concurrently processed symbols.
    pub const DEFAULT_PARALLEL_SYMBOLS: usize = 4;

    /// Creates a configuration for the given symbols with default settings.
    ///
    /// Repeated symbols are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols: unique_symbols(symbols),
            ..Self::default()
        }
    }

    /// Sets the lookback window.
    #[must_use]
    pub const fn with_lookback(mut self, lookback: LookbackWindow) -> Self {
        self.lookback = lookback;
        self
    }

    /// Sets the symbol concurrency. Zero is treated as one.
    #[must_use]
    pub fn with_parallel_symbols(mut self, parallel: usize) -> Self {
        self.parallel_symbols = parallel.max(1);
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            lookback: LookbackWindow::default(),
            parallel_symbols: Self::DEFAULT_PARALLEL_SYMBOLS,
        }
    }
}

/// Drops repeated symbols, keeping first-seen order.
pub(crate) fn unique_symbols<I>(symbols: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = Symbol>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}
