//! Run and per-symbol outcome reporting.

use chrono::{DateTime, NaiveDate, Utc};
use dayroll_types::{DailyAggregate, Symbol};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FailureKind, SymbolError};

/// Unique identifier for an ingestion run.
pub type RunId = Uuid;

/// Final state of one symbol in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolStatus {
    /// Every emitted aggregate was committed.
    Succeeded,
    /// Ingestion stopped early; see the outcome's failure.
    Failed,
    /// The run was cancelled before the symbol started.
    Cancelled,
}

impl SymbolStatus {
    /// Returns the status as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SymbolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts for a symbol that was ingested without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSummary {
    /// The symbol.
    pub symbol: Symbol,
    /// Watermark before this run.
    pub watermark: Option<NaiveDate>,
    /// Well-formed quotes returned by the source.
    pub fetched: usize,
    /// Records skipped as malformed.
    pub malformed: usize,
    /// Quotes dropped for falling outside the lookback window.
    pub outside_lookback: usize,
    /// Quotes dropped for falling on or before the watermark.
    pub already_committed: usize,
    /// Aggregates appended to the store.
    pub committed: usize,
    /// Earliest committed date.
    pub first_date: Option<NaiveDate>,
    /// Latest committed date.
    pub last_date: Option<NaiveDate>,
}

impl SymbolSummary {
    /// Creates an empty summary.
    #[must_use]
    pub const fn new(symbol: Symbol, watermark: Option<NaiveDate>) -> Self {
        Self {
            symbol,
            watermark,
            fetched: 0,
            malformed: 0,
            outside_lookback: 0,
            already_committed: 0,
            committed: 0,
            first_date: None,
            last_date: None,
        }
    }

    /// Records a committed aggregate.
    pub fn record(&mut self, aggregate: &DailyAggregate) {
        self.committed += 1;
        self.first_date = Some(self.first_date.map_or(aggregate.date, |d| d.min(aggregate.date)));
        self.last_date = Some(self.last_date.map_or(aggregate.date, |d| d.max(aggregate.date)));
    }
}

/// One symbol's line in a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOutcome {
    /// The symbol.
    pub symbol: Symbol,
    /// Final state.
    pub status: SymbolStatus,
    /// Failure category, for failed symbols.
    pub failure: Option<FailureKind>,
    /// Aggregates committed during this run.
    pub committed: usize,
    /// Records skipped as malformed.
    pub malformed: usize,
    /// Earliest date committed during this run.
    pub first_date: Option<NaiveDate>,
    /// Latest date committed during this run.
    pub last_date: Option<NaiveDate>,
    /// Error message, for failed symbols.
    pub error: Option<String>,
}

impl SymbolOutcome {
    /// Builds an outcome from a finished ingestion.
    #[must_use]
    pub fn from_result(symbol: Symbol, result: &Result<SymbolSummary, SymbolError>) -> Self {
        match result {
            Ok(summary) => Self {
                symbol,
                status: SymbolStatus::Succeeded,
                failure: None,
                committed: summary.committed,
                malformed: summary.malformed,
                first_date: summary.first_date,
                last_date: summary.last_date,
                error: None,
            },
            Err(err) => Self {
                symbol,
                status: SymbolStatus::Failed,
                failure: Some(err.kind()),
                committed: err.committed(),
                malformed: 0,
                first_date: None,
                last_date: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Builds the outcome of a symbol that never started.
    #[must_use]
    pub const fn cancelled(symbol: Symbol) -> Self {
        Self {
            symbol,
            status: SymbolStatus::Cancelled,
            failure: None,
            committed: 0,
            malformed: 0,
            first_date: None,
            last_date: None,
            error: None,
        }
    }

    /// Returns true if the symbol failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == SymbolStatus::Failed
    }
}

/// Result of one ingestion run over every configured symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// Date the lookback window is measured from.
    pub run_date: NaiveDate,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
    /// Per-symbol outcomes, in configuration order.
    pub outcomes: Vec<SymbolOutcome>,
}

impl RunReport {
    /// Returns the number of symbols with the given status.
    #[must_use]
    pub fn count(&self, status: SymbolStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Returns true if any symbol failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(SymbolOutcome::is_failure)
    }

    /// Returns the total number of aggregates committed by the run.
    #[must_use]
    pub fn total_committed(&self) -> usize {
        self.outcomes.iter().map(|o| o.committed).sum()
    }

    /// Returns the outcome for a symbol.
    #[must_use]
    pub fn outcome(&self, symbol: &Symbol) -> Option<&SymbolOutcome> {
        self.outcomes.iter().find(|o| &o.symbol == symbol)
    }

    /// Returns the run's wall-clock duration.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
