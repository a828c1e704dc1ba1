//! Watermark resolution.

use std::sync::Arc;

use chrono::NaiveDate;
use dayroll_types::{RecordStore, StoreError, Symbol};
use tracing::debug;

/// Resolves the latest committed date for a symbol.
///
/// The watermark is never cached; each call reads the store.
#[derive(Clone)]
pub struct WatermarkResolver {
    store: Arc<dyn RecordStore>,
}

impl WatermarkResolver {
    /// Creates a resolver over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Returns the symbol's maximum committed date, or `None` if it has no
    /// committed aggregates.
    ///
    /// # Errors
    ///
    /// Propagates the store's error. A failed read is never treated as
    /// "no watermark".
    pub async fn resolve(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError> {
        let watermark = self.store.max_date(symbol).await?;
        debug!(%symbol, ?watermark, "resolved watermark");
        Ok(watermark)
    }
}

impl std::fmt::Debug for WatermarkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkResolver").finish_non_exhaustive()
    }
}
