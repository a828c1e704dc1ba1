//! Daily aggregate record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Symbol, round_money};

/// The committed open/close/volume summary for one symbol on one date.
///
/// At most one aggregate exists per `(symbol, date)`; once appended to a
/// store it is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Trading date.
    pub date: NaiveDate,
    /// Open of the earliest hour seen that day.
    #[serde(with = "rust_decimal::serde::str")]
    pub open_price: Decimal,
    /// Close of the latest hour seen that day.
    #[serde(with = "rust_decimal::serde::str")]
    pub close_price: Decimal,
    /// Total volume over the day's quotes.
    pub volume: u64,
}

impl DailyAggregate {
    /// Creates a new aggregate, rounding both prices to two decimal places.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        date: NaiveDate,
        open_price: Decimal,
        close_price: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            date,
            open_price: round_money(open_price),
            close_price: round_money(close_price),
            volume,
        }
    }

    /// Returns the day's price change (close - open).
    #[must_use]
    pub fn change(&self) -> Decimal {
        self.close_price - self.open_price
    }
}
