//! SQLite-backed aggregate store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use dayroll_aggregate::summarize;
use dayroll_types::{
    AggregateQuery, DailyAggregate, DateRange, Page, RecordStore, StoreError, Symbol,
    SymbolStatistics,
};
use rust_decimal::Decimal;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS daily_aggregates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    date TEXT NOT NULL,
    open_price TEXT NOT NULL,
    close_price TEXT NOT NULL,
    volume INTEGER NOT NULL,
    UNIQUE (symbol, date)
);
"#;

type AggregateRow = (String, NaiveDate, String, String, i64);

/// [`RecordStore`] backed by a single SQLite database.
///
/// Prices are stored as decimal strings so they round-trip exactly. The
/// `(symbol, date)` uniqueness constraint enforces at most one aggregate
/// per day.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Opens (creating if missing) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the file cannot be opened or the
    /// schema cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_error)?;

        debug!(path = %path.display(), "opened aggregate store");
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the schema cannot be created.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // Every in-memory connection is its own database, so pin the pool to one.
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(db_error)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(db_error)?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the schema cannot be created.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(db_error)?;
        Ok(Self { pool })
    }

    /// Lists committed aggregates, newest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] for invalid pagination, or a
    /// database error.
    pub async fn query(&self, query: &AggregateQuery) -> Result<Page<DailyAggregate>, StoreError> {
        query.validate()?;
        let symbol = query.symbol.as_ref().map(Symbol::as_str);

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM daily_aggregates
            WHERE (?1 IS NULL OR symbol = ?1)
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            "#,
        )
        .bind(symbol)
        .bind(query.start)
        .bind(query.end)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let offset = i64::try_from(query.offset())
            .map_err(|_| StoreError::InvalidQuery("page is out of range".into()))?;

        let rows = sqlx::query_as::<_, AggregateRow>(
            r#"
            SELECT symbol, date, open_price, close_price, volume
            FROM daily_aggregates
            WHERE (?1 IS NULL OR symbol = ?1)
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            ORDER BY date DESC, symbol ASC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(symbol)
        .bind(query.start)
        .bind(query.end)
        .bind(i64::from(query.limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows
            .into_iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        let count = u64::try_from(count).unwrap_or_default();

        Ok(Page::new(items, count, query.limit, query.page))
    }

    /// Averages each symbol's aggregates over `range`, ordered by symbol.
    ///
    /// Symbols with no aggregates in the range are omitted.
    ///
    /// # Errors
    ///
    /// Returns a database error if rows cannot be read or decoded.
    pub async fn statistics(
        &self,
        symbols: &[Symbol],
        range: DateRange,
    ) -> Result<Vec<SymbolStatistics>, StoreError> {
        let mut symbols = symbols.to_vec();
        symbols.sort();
        symbols.dedup();

        let mut stats = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let rows = self.range(symbol, range).await?;
            if let Some(summary) = summarize(symbol, range, &rows) {
                stats.push(summary);
            }
        }
        Ok(stats)
    }

    /// Returns one symbol's aggregates inside `range`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if rows cannot be read or decoded.
    pub async fn range(
        &self,
        symbol: &Symbol,
        range: DateRange,
    ) -> Result<Vec<DailyAggregate>, StoreError> {
        sqlx::query_as::<_, AggregateRow>(
            r#"
            SELECT symbol, date, open_price, close_price, volume
            FROM daily_aggregates
            WHERE symbol = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            "#,
        )
        .bind(symbol.as_str())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(decode_row)
        .collect()
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn max_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, StoreError> {
        let (date,): (Option<String>,) =
            sqlx::query_as("SELECT MAX(date) FROM daily_aggregates WHERE symbol = ?")
                .bind(symbol.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        date.map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|e| StoreError::Corrupt(format!("date '{d}': {e}")))
        })
        .transpose()
    }

    async fn append(&self, aggregate: &DailyAggregate) -> Result<(), StoreError> {
        let volume = i64::try_from(aggregate.volume).map_err(|_| {
            StoreError::Database(format!(
                "volume {} for {} on {} exceeds the column range",
                aggregate.volume, aggregate.symbol, aggregate.date
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO daily_aggregates (symbol, date, open_price, close_price, volume)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(aggregate.symbol.as_str())
        .bind(aggregate.date)
        .bind(aggregate.open_price.to_string())
        .bind(aggregate.close_price.to_string())
        .bind(volume)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate {
                symbol: aggregate.symbol.clone(),
                date: aggregate.date,
            },
            other => db_error(other),
        })?;

        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn decode_row((symbol, date, open, close, volume): AggregateRow) -> Result<DailyAggregate, StoreError> {
    let symbol =
        Symbol::new(&symbol).map_err(|e| StoreError::Corrupt(format!("symbol '{symbol}': {e}")))?;
    let open_price = Decimal::from_str(&open)
        .map_err(|e| StoreError::Corrupt(format!("open price '{open}': {e}")))?;
    let close_price = Decimal::from_str(&close)
        .map_err(|e| StoreError::Corrupt(format!("close price '{close}': {e}")))?;
    let volume =
        u64::try_from(volume).map_err(|_| StoreError::Corrupt(format!("volume {volume}")))?;

    Ok(DailyAggregate::new(symbol, date, open_price, close_price, volume))
}
