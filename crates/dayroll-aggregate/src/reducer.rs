//! Streaming quote-to-daily reduction.

use dayroll_types::{DailyAggregate, Quote, ReduceError};
use std::iter::Fuse;

use crate::{DayGroup, Step};

/// Streaming daily reducer.
///
/// Consumes one symbol's quotes in strictly descending timestamp order and
/// emits each day's aggregate once a quote from an earlier day arrives.
#[derive(Debug, Default)]
pub struct DailyReducer {
    current: Option<DayGroup>,
}

impl DailyReducer {
    /// Creates a reducer with no open day.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Processes a quote, potentially emitting a completed day.
    ///
    /// Returns `Ok(Some(aggregate))` when this quote closes the open day.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError`] if the quote is not strictly earlier than the
    /// previous one or the day's volume overflows. The open day is discarded.
    pub fn process(&mut self, quote: &Quote) -> Result<Option<DailyAggregate>, ReduceError> {
        match self.current.take() {
            Some(group) => match group.absorb(quote)? {
                Step::Continue(next) => {
                    self.current = Some(next);
                    Ok(None)
                }
                Step::Closed { aggregate, next } => {
                    self.current = Some(next);
                    Ok(Some(aggregate))
                }
            },
            None => {
                self.current = Some(DayGroup::open(quote));
                Ok(None)
            }
        }
    }

    /// Finishes reduction, returning the trailing open day if any.
    #[must_use]
    pub fn finish(self) -> Option<DailyAggregate> {
        self.current.map(DayGroup::finish)
    }

    /// Returns the day currently being accumulated.
    #[must_use]
    pub const fn current(&self) -> Option<&DayGroup> {
        self.current.as_ref()
    }
}

/// Lazy iterator of daily aggregates over a descending quote stream.
///
/// Yields days in emission order (most recent first). After a reduction
/// error it yields the error once and then ends.
#[derive(Debug)]
pub struct DailyAggregates<I> {
    quotes: Fuse<I>,
    reducer: Option<DailyReducer>,
}

impl<I: Iterator<Item = Quote>> Iterator for DailyAggregates<I> {
    type Item = Result<DailyAggregate, ReduceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reducer = self.reducer.as_mut()?;

        for quote in self.quotes.by_ref() {
            match reducer.process(&quote) {
                Ok(Some(aggregate)) => return Some(Ok(aggregate)),
                Ok(None) => {}
                Err(err) => {
                    self.reducer = None;
                    return Some(Err(err));
                }
            }
        }

        self.reducer.take()?.finish().map(Ok)
    }
}

/// Reduces a descending quote stream into daily aggregates.
pub fn reduce_daily<I>(quotes: I) -> DailyAggregates<I::IntoIter>
where
    I: IntoIterator<Item = Quote>,
{
    DailyAggregates {
        quotes: quotes.into_iter().fuse(),
        reducer: Some(DailyReducer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dayroll_types::Symbol;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_quote(day: u32, hour: u32, open: Decimal, close: Decimal, volume: u64) -> Quote {
        Quote::new(
            Symbol::new("IBM").unwrap(),
            date(day).and_hms_opt(hour, 0, 0).unwrap(),
            open,
            close,
            volume,
        )
    }

    fn collect_ok(quotes: Vec<Quote>) -> Vec<DailyAggregate> {
        reduce_daily(quotes).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_reference_example() {
        let quotes = vec![
            make_quote(3, 10, dec!(101), dec!(105), 50),
            make_quote(3, 9, dec!(100), dec!(105), 30),
            make_quote(2, 15, dec!(98), dec!(99), 40),
        ];

        let days = collect_ok(quotes);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].date, date(3));
        assert_eq!(days[0].open_price, dec!(100));
        assert_eq!(days[0].close_price, dec!(105));
        assert_eq!(days[0].volume, 80);

        assert_eq!(days[1].date, date(2));
        assert_eq!(days[1].open_price, dec!(98));
        assert_eq!(days[1].close_price, dec!(99));
        assert_eq!(days[1].volume, 40);
    }

    #[test]
    fn test_three_days_emitted_most_recent_first() {
        let quotes = vec![
            make_quote(5, 15, dec!(10), dec!(11), 1),
            make_quote(5, 9, dec!(12), dec!(13), 2),
            make_quote(4, 12, dec!(14), dec!(15), 3),
            make_quote(2, 16, dec!(16), dec!(17), 4),
            make_quote(2, 10, dec!(18), dec!(19), 5),
        ];

        let dates: Vec<_> = collect_ok(quotes).into_iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![date(5), date(4), date(2)]);
    }

    #[test]
    fn test_open_from_earliest_hour_close_from_latest_hour() {
        let quotes = vec![
            make_quote(3, 15, dec!(103.50), dec!(104.25), 10),
            make_quote(3, 13, dec!(102.00), dec!(103.00), 10),
            make_quote(3, 11, dec!(101.10), dec!(101.90), 10),
            make_quote(3, 9, dec!(100.05), dec!(100.80), 10),
        ];

        let days = collect_ok(quotes);
        assert_eq!(days[0].open_price, dec!(100.05));
        assert_eq!(days[0].close_price, dec!(104.25));
    }

    #[test]
    fn test_volume_is_exact_sum() {
        let quotes = vec![
            make_quote(3, 16, dec!(1), dec!(1), 1_000_000),
            make_quote(3, 12, dec!(1), dec!(1), 250_000),
            make_quote(3, 8, dec!(1), dec!(1), 7),
        ];

        assert_eq!(collect_ok(quotes)[0].volume, 1_250_007);
    }

    #[test]
    fn test_trailing_group_is_flushed() {
        let quotes = vec![make_quote(3, 10, dec!(1), dec!(2), 5)];

        let days = collect_ok(quotes);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].volume, 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(collect_ok(vec![]).is_empty());
    }

    #[test]
    fn test_prices_rounded_to_cents() {
        let quotes = vec![make_quote(3, 10, dec!(101.2350), dec!(105.1249), 1)];

        let days = collect_ok(quotes);
        assert_eq!(days[0].open_price, dec!(101.24));
        assert_eq!(days[0].close_price, dec!(105.12));
    }

    #[test]
    fn test_violation_after_emitted_day() {
        let quotes = vec![
            make_quote(3, 10, dec!(1), dec!(1), 1),
            make_quote(2, 10, dec!(1), dec!(1), 1),
            make_quote(4, 10, dec!(1), dec!(1), 1),
            make_quote(1, 10, dec!(1), dec!(1), 1),
        ];

        let mut days = reduce_daily(quotes);
        let first = days.next().unwrap().unwrap();
        assert_eq!(first.date, date(3));

        let Some(Err(ReduceError::Ordering(err))) = days.next() else {
            panic!("expected ordering violation");
        };
        assert_eq!(err.offending, date(4).and_hms_opt(10, 0, 0).unwrap());

        assert!(days.next().is_none());
    }

    #[test]
    fn test_ascending_input_is_rejected() {
        let quotes = vec![
            make_quote(2, 9, dec!(1), dec!(1), 1),
            make_quote(2, 10, dec!(1), dec!(1), 1),
        ];

        let results: Vec<_> = reduce_daily(quotes).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_process_and_finish() {
        let mut reducer = DailyReducer::new();

        assert!(reducer
            .process(&make_quote(3, 10, dec!(1), dec!(1), 1))
            .unwrap()
            .is_none());
        assert_eq!(reducer.current().unwrap().date(), date(3));

        let closed = reducer
            .process(&make_quote(2, 10, dec!(1), dec!(1), 1))
            .unwrap()
            .unwrap();
        assert_eq!(closed.date, date(3));

        let last = reducer.finish().unwrap();
        assert_eq!(last.date, date(2));
    }
}
