//! Display utilities and output formatting for the dayroll CLI.

use clap::ValueEnum;
use dayroll_lib::prelude::*;
use std::fmt::Write as _;

/// Output format for query results.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
        }
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn outcome_row(outcome: &SymbolOutcome) -> String {
    let span = match (outcome.first_date, outcome.last_date) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (first, last) => format!("{}..{}", date_or_dash(first), date_or_dash(last)),
    };
    format!(
        "{:<10} {:<10} {:>9} {:>9} {:<22} {}",
        outcome.symbol,
        outcome.status,
        outcome.committed,
        outcome.malformed,
        if outcome.committed == 0 { "-".to_string() } else { span },
        outcome.failure.map_or_else(String::new, |k| k.to_string()),
    )
}

/// Renders the end-of-run summary table.
pub(crate) fn run_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {} for {}", report.run_id, report.run_date);
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:>9} {:>9} {:<22} {}",
        "SYMBOL", "STATUS", "COMMITTED", "MALFORMED", "DATES", "FAILURE"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));

    for outcome in &report.outcomes {
        let _ = writeln!(out, "{}", outcome_row(outcome));
    }
    for outcome in report.outcomes.iter().filter(|o| o.is_failure()) {
        if let Some(err) = &outcome.error {
            let _ = writeln!(out, "  {}: {}", outcome.symbol, err);
        }
    }

    let _ = writeln!(
        out,
        "\nSucceeded: {}  Failed: {}  Cancelled: {}  Aggregates committed: {}",
        report.count(SymbolStatus::Succeeded),
        report.count(SymbolStatus::Failed),
        report.count(SymbolStatus::Cancelled),
        report.total_committed()
    );
    out
}

/// Renders the pagination footer for a query page.
pub(crate) fn page_footer<T>(page: &Page<T>) -> String {
    format!(
        "Page {} of {} ({} aggregates, {} per page)",
        page.page, page.pages, page.count, page.limit
    )
}
