use clap::{Parser, Subcommand};
use std::path::PathBuf;

use optchain::analyze::OutputFormat;
use optchain::config::Currency;

/// Options-chain analytics for BTC and ETH: open interest, volume,
/// put/call ratios, implied-volatility skew and hotspots.
#[derive(Parser)]
#[command(name = "optchain", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a currency's option chain and print or save its daily summary
    Analyze {
        /// Underlying to analyze
        #[arg(long, value_enum, default_value = "BTC")]
        currency: Currency,

        /// Output format: console (default), csv, or json
        #[arg(long, value_enum, default_value = "console")]
        output: OutputFormat,

        /// Directory for csv/json output
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Analyze a snapshot saved by fetch-data instead of calling the exchange
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// JSON file overriding analytics thresholds and bands
        #[arg(long)]
        config: Option<PathBuf>,

        /// Hotspot deviation threshold in percent (overrides the config file)
        #[arg(long)]
        hotspot_threshold: Option<f64>,
    },

    /// List options whose IV deviates from their expiry's mean IV
    Hotspots {
        /// Underlying to scan
        #[arg(long, value_enum, default_value = "BTC")]
        currency: Currency,

        /// Minimum |deviation| in percent (default: from config, 20)
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum rows to print
        #[arg(long, default_value = "25")]
        limit: usize,

        /// Scan a snapshot saved by fetch-data instead of calling the exchange
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// JSON file overriding analytics thresholds and bands
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Save raw option-chain snapshots to CSV for offline analysis
    FetchData {
        /// Underlying to fetch (default: both BTC and ETH)
        #[arg(long, value_enum)]
        currency: Option<Currency>,

        /// Output directory for CSV files and manifest.json
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },

    /// Combine the latest BTC and ETH CSV summaries into one comparison
    Consolidate {
        /// Directory holding analyze --output csv files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Only consider files from this date (YYYYMMDD)
        #[arg(long)]
        date: Option<String>,

        /// Also write a Markdown report
        #[arg(long)]
        markdown: bool,
    },

    /// Analyze BTC and ETH to CSV, then consolidate
    Daily {
        /// Output directory for all files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Skip the Markdown report
        #[arg(long)]
        no_markdown: bool,

        /// JSON file overriding analytics thresholds and bands
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Output the JSON schema of the daily summary
    Schema,
}
