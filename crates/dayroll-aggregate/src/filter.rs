//! Lookback and watermark filtering.

use chrono::{Days, NaiveDate};
use dayroll_types::Quote;
use serde::{Deserialize, Serialize};

/// Trailing window, in days, beyond which quotes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookbackWindow(u32);

impl LookbackWindow {
    /// Default window: two weeks.
    pub const DEFAULT_DAYS: u32 = 14;

    /// Creates a window of the given number of days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self(days)
    }

    /// Returns the window length in days.
    #[must_use]
    pub const fn len_days(&self) -> u32 {
        self.0
    }

    /// Returns the earliest date kept for a run on `run_date`.
    #[must_use]
    pub fn cutoff(&self, run_date: NaiveDate) -> NaiveDate {
        run_date
            .checked_sub_days(Days::new(u64::from(self.0)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Returns true if a quote dated `date` falls inside the window.
    #[must_use]
    pub fn includes(&self, date: NaiveDate, run_date: NaiveDate) -> bool {
        date >= self.cutoff(run_date)
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

impl std::fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days", self.0)
    }
}

/// Drops quotes dated before `run_date - window`, preserving order.
pub fn filter_lookback<I>(
    quotes: I,
    window: LookbackWindow,
    run_date: NaiveDate,
) -> impl Iterator<Item = Quote>
where
    I: IntoIterator<Item = Quote>,
{
    let cutoff = window.cutoff(run_date);
    quotes.into_iter().filter(move |q| q.date() >= cutoff)
}

/// Drops quotes dated at or before `watermark`, preserving order.
///
/// With no watermark every quote passes.
pub fn exclude_committed<I>(quotes: I, watermark: Option<NaiveDate>) -> impl Iterator<Item = Quote>
where
    I: IntoIterator<Item = Quote>,
{
    quotes
        .into_iter()
        .filter(move |q| watermark.is_none_or(|committed| q.date() > committed))
}
