//! Synthetic quote generation for dayroll benchmarks.

use chrono::{Days, NaiveDate, NaiveTime};
use dayroll_lib::{Quote, Symbol};
use rust_decimal::Decimal;
use std::fmt::Write as _;

/// First and last hourly bar of a synthetic trading day.
const FIRST_HOUR: u32 = 4;
const LAST_HOUR: u32 = 19;

/// Generates `days` days of hourly quotes ending on `last_day`, most recent
/// first, as the vendor delivers them.
#[must_use]
pub fn synthetic_quotes(symbol: &Symbol, last_day: NaiveDate, days: u64) -> Vec<Quote> {
    let mut quotes = Vec::with_capacity((days as usize) * (LAST_HOUR - FIRST_HOUR + 1) as usize);
    for offset in 0..days {
        let Some(date) = last_day.checked_sub_days(Days::new(offset)) else {
            break;
        };
        for hour in (FIRST_HOUR..=LAST_HOUR).rev() {
            let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                continue;
            };
            let base = Decimal::new(10_000 + i64::from(hour) * 7 + offset as i64, 2);
            quotes.push(Quote::new(
                symbol.clone(),
                date.and_time(time),
                base,
                base + Decimal::new(25, 2),
                1_000 + u64::from(hour),
            ));
        }
    }
    quotes
}

/// Renders quotes as an intraday JSON payload.
#[must_use]
pub fn synthetic_payload(quotes: &[Quote]) -> String {
    let mut body = String::from("{\"Meta Data\": {}, \"Time Series (60min)\": {");
    for (i, q) in quotes.iter().enumerate() {
        if i > 0 {
            body.push(',');
        }
        let _ = write!(
            body,
            "\"{}\": {{\"1. open\": \"{}\", \"2. high\": \"{}\", \"3. low\": \"{}\", \"4. close\": \"{}\", \"5. volume\": \"{}\"}}",
            q.timestamp.format("%Y-%m-%d %H:%M:%S"),
            q.open_price,
            q.close_price,
            q.open_price,
            q.close_price,
            q.volume
        );
    }
    body.push_str("}}");
    body
}
