//! Intraday quote representation.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// A single intraday price/volume sample for one symbol.
///
/// Timestamps are the vendor's exchange-local wall-clock time; only the
/// date and hour are significant to daily aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol this sample belongs to.
    pub symbol: Symbol,
    /// Sample time (exchange-local).
    pub timestamp: NaiveDateTime,
    /// Price at the start of the sample interval.
    pub open_price: Decimal,
    /// Price at the end of the sample interval.
    pub close_price: Decimal,
    /// Shares traded during the sample interval.
    pub volume: u64,
}

impl Quote {
    /// Creates a new quote.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        timestamp: NaiveDateTime,
        open_price: Decimal,
        close_price: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            timestamp,
            open_price,
            close_price,
            volume,
        }
    }

    /// Returns the trading date of the sample.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns the hour of day of the sample (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_date_and_hour() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let quote = Quote::new(
            Symbol::new("IBM").unwrap(),
            timestamp,
            dec!(98),
            dec!(99),
            40,
        );

        assert_eq!(quote.date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(quote.hour(), 15);
    }
}
