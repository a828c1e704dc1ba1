//! dayroll CLI - incremental daily aggregation of intraday quotes.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use dayroll_lib::Symbol;
use std::path::PathBuf;

mod commands;
mod display;
mod logging;
mod settings;

use display::Format;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "dayroll")]
#[command(about = "Incremental daily open/close/volume aggregation of intraday quotes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file. Defaults to dayroll.toml in the platform config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides [store] path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch quotes and commit new daily aggregates
    Ingest {
        /// Date the lookback window is measured from (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        run_date: Option<NaiveDate>,

        /// Comma-separated symbols (overrides `symbols`)
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<Symbol>>,

        /// Lookback window in days (overrides `lookback_window_days`)
        #[arg(long)]
        lookback_days: Option<u32>,

        /// Alpha Vantage API key (overrides [source] api_key)
        #[arg(long, env = "DAYROLL_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Reduce and report without writing to the database
        #[arg(long)]
        dry_run: bool,
    },

    /// List committed daily aggregates
    Query {
        /// Restrict to one symbol
        #[arg(short, long)]
        symbol: Option<Symbol>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Rows per page
        #[arg(short, long, default_value = "5")]
        limit: u32,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Average daily open, close and volume per symbol over a date range
    Stats {
        /// Comma-separated symbols. Defaults to the configured symbols.
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<Symbol>>,

        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end: NaiveDate,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Show the latest committed date for a symbol
    Watermark {
        /// Symbol to inspect
        symbol: Symbol,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match command {
        Commands::Ingest {
            run_date,
            symbols,
            lookback_days,
            api_key,
            report,
            dry_run,
        } => {
            let settings = settings.with_overrides(Overrides {
                symbols,
                lookback_days,
                database: cli.database,
                api_key,
            });
            let run_date = run_date.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::ingest::ingest(&settings, run_date, report, dry_run, cli.quiet).await
        }
        Commands::Query {
            symbol,
            start,
            end,
            limit,
            page,
            format,
        } => {
            let settings = settings.with_overrides(Overrides {
                database: cli.database,
                ..Default::default()
            });
            let query = dayroll_lib::AggregateQuery {
                symbol,
                start,
                end,
                limit,
                page,
            };
            commands::query::query(&settings, &query, format, cli.quiet).await
        }
        Commands::Stats {
            symbols,
            start,
            end,
            format,
        } => {
            let settings = settings.with_overrides(Overrides {
                symbols,
                database: cli.database,
                ..Default::default()
            });
            commands::stats::stats(&settings, start, end, format).await
        }
        Commands::Watermark { symbol } => {
            let settings = settings.with_overrides(Overrides {
                database: cli.database,
                ..Default::default()
            });
            commands::watermark::watermark(&settings, &symbol).await
        }
    }
}
