//! Read-side query and result types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{StoreError, Symbol};

/// Default number of aggregates per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 5;

/// Filter and pagination for listing committed aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateQuery {
    /// Restrict to one symbol.
    pub symbol: Option<Symbol>,
    /// Earliest date (inclusive).
    pub start: Option<NaiveDate>,
    /// Latest date (inclusive).
    pub end: Option<NaiveDate>,
    /// Page size.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
}

impl Default for AggregateQuery {
    fn default() -> Self {
        Self {
            symbol: None,
            start: None,
            end: None,
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
        }
    }
}

impl AggregateQuery {
    /// Checks the pagination parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] for a zero limit or an inverted
    /// date filter.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.limit == 0 {
            return Err(StoreError::InvalidQuery("limit must be at least 1".into()));
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(StoreError::InvalidQuery(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(())
    }

    /// Returns the number of rows to skip. Pages at or below 1 start at 0.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        if self.page <= 1 {
            0
        } else {
            self.limit as u64 * (self.page as u64 - 1)
        }
    }

    /// Returns true if the aggregate for `symbol` on `date` passes the filter.
    #[must_use]
    pub fn matches(&self, symbol: &Symbol, date: NaiveDate) -> bool {
        self.symbol.as_ref().is_none_or(|s| s == symbol)
            && self.start.is_none_or(|start| date >= start)
            && self.end.is_none_or(|end| date <= end)
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching rows across all pages.
    pub count: u64,
    /// Page size.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub pages: u64,
}

impl<T> Page<T> {
    /// Creates a page, deriving the page total from `count` and `limit`.
    #[must_use]
    pub fn new(items: Vec<T>, count: u64, limit: u32, page: u32) -> Self {
        let limit_rows = u64::from(limit.max(1));
        let pages = if limit_rows > count {
            1
        } else {
            count.div_ceil(limit_rows)
        };
        Self {
            items,
            count,
            limit,
            page,
            pages,
        }
    }

    /// Returns true if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Average daily figures for one symbol over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStatistics {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// First date of the requested range.
    pub start_date: NaiveDate,
    /// Last date of the requested range.
    pub end_date: NaiveDate,
    /// Number of daily aggregates averaged.
    pub days: u64,
    /// Mean daily open, two decimal places.
    #[serde(with = "rust_decimal::serde::str")]
    pub average_daily_open_price: Decimal,
    /// Mean daily close, two decimal places.
    #[serde(with = "rust_decimal::serde::str")]
    pub average_daily_close_price: Decimal,
    /// Mean daily volume, two decimal places.
    #[serde(with = "rust_decimal::serde::str")]
    pub average_daily_volume: Decimal,
}
