//! Per-day accumulation state.

use chrono::{NaiveDate, NaiveDateTime};
use dayroll_types::{
    DailyAggregate, OrderingViolation, Quote, ReduceError, Symbol, VolumeOverflow,
};
use rust_decimal::Decimal;

/// The in-progress accumulation for the day currently being reduced.
///
/// A group is an immutable value: [`DayGroup::absorb`] consumes it and
/// returns the next state, so the reduction is a plain fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    symbol: Symbol,
    date: NaiveDate,
    earliest_hour: u32,
    latest_hour: u32,
    open_price: Decimal,
    close_price: Decimal,
    volume: u64,
    last_timestamp: NaiveDateTime,
}

/// Result of absorbing one quote into a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The quote belonged to the open day.
    Continue(DayGroup),
    /// The quote started an earlier day, closing the previous one.
    Closed {
        /// The completed day.
        aggregate: DailyAggregate,
        /// The group opened by the boundary quote.
        next: DayGroup,
    },
}

impl DayGroup {
    /// Opens a group from the first quote seen for a day.
    ///
    /// Under descending order that quote is the day's latest hour, so it
    /// fixes the close. It also seeds the open, which later (earlier-hour)
    /// quotes refine.
    #[must_use]
    pub fn open(quote: &Quote) -> Self {
        let hour = quote.hour();
        Self {
            symbol: quote.symbol.clone(),
            date: quote.date(),
            earliest_hour: hour,
            latest_hour: hour,
            open_price: quote.open_price,
            close_price: quote.close_price,
            volume: quote.volume,
            last_timestamp: quote.timestamp,
        }
    }

    /// Absorbs the next quote in the stream.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::Ordering`] if the quote is not strictly
    /// earlier than the previously absorbed one. This covers a later date, a
    /// later hour within the same day, and a repeated timestamp.
    ///
    /// Returns [`ReduceError::VolumeOverflow`] if the day's volume no longer
    /// fits in a `u64`.
    pub fn absorb(mut self, quote: &Quote) -> Result<Step, ReduceError> {
        if quote.timestamp >= self.last_timestamp {
            return Err(OrderingViolation {
                symbol: quote.symbol.clone(),
                previous: self.last_timestamp,
                offending: quote.timestamp,
            }
            .into());
        }

        if quote.date() < self.date {
            return Ok(Step::Closed {
                aggregate: self.finish(),
                next: Self::open(quote),
            });
        }

        let hour = quote.hour();
        if hour < self.earliest_hour {
            self.earliest_hour = hour;
            self.open_price = quote.open_price;
        }
        self.volume = self
            .volume
            .checked_add(quote.volume)
            .ok_or_else(|| VolumeOverflow {
                symbol: self.symbol.clone(),
                date: self.date,
            })?;
        self.last_timestamp = quote.timestamp;
        Ok(Step::Continue(self))
    }

    /// Closes the group into a daily aggregate.
    #[must_use]
    pub fn finish(self) -> DailyAggregate {
        DailyAggregate::new(
            self.symbol,
            self.date,
            self.open_price,
            self.close_price,
            self.volume,
        )
    }

    /// Returns the day being accumulated.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the earliest hour seen so far.
    #[must_use]
    pub const fn earliest_hour(&self) -> u32 {
        self.earliest_hour
    }

    /// Returns the latest hour seen (the first quote of the day).
    #[must_use]
    pub const fn latest_hour(&self) -> u32 {
        self.latest_hour
    }

    /// Returns the volume accumulated so far.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_quote(day: u32, hour: u32, open: Decimal, close: Decimal, volume: u64) -> Quote {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Quote::new(Symbol::new("IBM").unwrap(), timestamp, open, close, volume)
    }

    #[test]
    fn test_open_seeds_both_prices() {
        let group = DayGroup::open(&make_quote(3, 15, dec!(98), dec!(99), 40));

        assert_eq!(group.earliest_hour(), 15);
        assert_eq!(group.latest_hour(), 15);
        assert_eq!(group.volume(), 40);

        let agg = group.finish();
        assert_eq!(agg.open_price, dec!(98));
        assert_eq!(agg.close_price, dec!(99));
    }

    #[test]
    fn test_absorb_same_day_refines_open() {
        let group = DayGroup::open(&make_quote(3, 10, dec!(101), dec!(105), 50));
        let Ok(Step::Continue(group)) = group.absorb(&make_quote(3, 9, dec!(100), dec!(104), 30))
        else {
            panic!("expected same-day continuation");
        };

        assert_eq!(group.earliest_hour(), 9);
        assert_eq!(group.latest_hour(), 10);
        assert_eq!(group.volume(), 80);
        let agg = group.finish();
        assert_eq!(agg.open_price, dec!(100));
        assert_eq!(agg.close_price, dec!(105));
    }

    #[test]
    fn test_absorb_earlier_day_closes() {
        let group = DayGroup::open(&make_quote(3, 10, dec!(101), dec!(105), 50));
        let step = group
            .absorb(&make_quote(2, 15, dec!(98), dec!(99), 40))
            .unwrap();

        let Step::Closed { aggregate, next } = step else {
            panic!("expected day boundary");
        };
        assert_eq!(aggregate.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(aggregate.volume, 50);
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(next.volume(), 40);
    }

    #[test]
    fn test_absorb_later_day_is_violation() {
        let group = DayGroup::open(&make_quote(2, 10, dec!(1), dec!(1), 1));
        let Err(ReduceError::Ordering(err)) =
            group.absorb(&make_quote(3, 9, dec!(1), dec!(1), 1))
        else {
            panic!("expected ordering violation");
        };

        assert_eq!(err.previous.to_string(), "2024-01-02 10:00:00");
        assert_eq!(err.offending.to_string(), "2024-01-03 09:00:00");
    }

    #[test]
    fn test_absorb_volume_overflow_is_reported() {
        let group = DayGroup::open(&make_quote(2, 10, dec!(1), dec!(1), u64::MAX));
        let err = group
            .absorb(&make_quote(2, 9, dec!(1), dec!(1), 1))
            .unwrap_err();

        assert_eq!(
            err,
            ReduceError::VolumeOverflow(VolumeOverflow {
                symbol: Symbol::new("IBM").unwrap(),
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            })
        );
    }

    #[test]
    fn test_absorb_later_hour_same_day_is_violation() {
        let group = DayGroup::open(&make_quote(2, 10, dec!(1), dec!(1), 1));
        assert!(group.absorb(&make_quote(2, 11, dec!(1), dec!(1), 1)).is_err());
    }

    #[test]
    fn test_absorb_duplicate_timestamp_is_violation() {
        let group = DayGroup::open(&make_quote(2, 10, dec!(1), dec!(1), 1));
        assert!(group.absorb(&make_quote(2, 10, dec!(2), dec!(2), 2)).is_err());
    }
}
