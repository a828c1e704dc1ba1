//! In-process aggregate store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use dayroll_aggregate::summarize;
use dayroll_types::{
    AggregateQuery, DailyAggregate, DateRange, Page, RecordStore, StoreError, Symbol,
    SymbolStatistics,
};
use tokio::sync::RwLock;

/// [`RecordStore`] holding aggregates in memory.
///
/// Enforces the same `(symbol, date)` uniqueness as the SQLite store.
/// Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<BTreeMap<(Symbol, NaiveDate), DailyAggregate>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed aggregates.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns true if nothing has been committed.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Returns every aggregate, ordered by symbol then date.
    pub async fn aggregates(&self) -> Vec<DailyAggregate> {
        self.rows.read().await.values().cloned().collect()
    }

    /// Lists committed aggregates, newest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] for invalid pagination.
    pub async fn query(&self, query: &AggregateQuery) -> Result<Page<DailyAggregate>, StoreError> {
        query.validate()?;

        let rows = self.rows.read().await;
        let mut matching: Vec<&DailyAggregate> = rows
            .values()
            .filter(|a| query.matches(&a.symbol, a.date))
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.symbol.cmp(&b.symbol)));

        let count = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, count, query.limit, query.page))
    }

    /// Averages each symbol's aggregates over `range`, ordered by symbol.
    ///
    /// Symbols with no aggregates in the range are omitted.
    pub async fn statistics(&self, symbols: &[Symbol], range: DateRange) -> Vec<SymbolStatistics> {
        let mut symbols = symbols.to_vec();
        symbols.sort();
        symbols.dedup();

        let rows = self.rows.read().await;
        symbols
            .iter()
            .filter_map(|symbol| summarize(symbol, range, rows.values()))
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn max_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .keys()
            .filter(|(s, _)| s == symbol)
            .map(|(_, date)| *date)
            .max())
    }

    async fn append(&self, aggregate: &DailyAggregate) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let key = (aggregate.symbol.clone(), aggregate.date);
        if rows.contains_key(&key) {
            return Err(StoreError::Duplicate {
                symbol: aggregate.symbol.clone(),
                date: aggregate.date,
            });
        }
        rows.insert(key, aggregate.clone());
        Ok(())
    }
}
