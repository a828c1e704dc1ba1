//! CSV output format.

use dayroll_types::{DailyAggregate, SymbolStatistics};
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }
}

impl Formatter for CsvFormatter {
    fn write_aggregates<W: Write + Send>(
        &self,
        aggregates: &[DailyAggregate],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "symbol{d}date{d}open_price{d}close_price{d}volume")?;
        }

        for agg in aggregates {
            writeln!(
                writer,
                "{}{d}{}{d}{:.2}{d}{:.2}{d}{}",
                agg.symbol,
                agg.date.format("%Y-%m-%d"),
                agg.open_price,
                agg.close_price,
                agg.volume
            )?;
        }

        Ok(())
    }

    fn write_statistics<W: Write + Send>(
        &self,
        stats: &[SymbolStatistics],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(
                writer,
                "symbol{d}start_date{d}end_date{d}days{d}average_daily_open_price{d}average_daily_close_price{d}average_daily_volume"
            )?;
        }

        for s in stats {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{:.2}{d}{:.2}{d}{:.2}",
                s.symbol,
                s.start_date,
                s.end_date,
                s.days,
                s.average_daily_open_price,
                s.average_daily_close_price,
                s.average_daily_volume
            )?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}
