use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::config::{AppConfig, Currency};
use crate::fetch_data::analyzer::OptionsAnalyzer;
use crate::fetch_data::deribit::DeribitClient;
use crate::fetch_data::block_on;
use crate::report::{console, files};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Csv,
    Json,
}

/// Options for the `analyze` command.
pub struct AnalyzeConfig {
    pub currency: Currency,
    pub output: OutputFormat,
    pub output_dir: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub hotspot_threshold: Option<f64>,
}

/// Build an analyzer holding `currency`'s snapshot, either reloaded from
/// `data_dir` or fetched live.
pub fn prepare(
    app: &AppConfig,
    currency: Currency,
    data_dir: Option<&Path>,
) -> Result<OptionsAnalyzer<DeribitClient>> {
    let client = DeribitClient::new(&app.base_url, app.api_key.clone())
        .context("creating HTTP client")?;
    let mut analyzer = OptionsAnalyzer::new(client, app.analytics.clone());

    match data_dir {
        Some(dir) => {
            println!("Loading {currency} snapshot from {} ...", dir.display());
            let snapshot = crate::data::load_snapshot(dir, currency.as_str())?;
            analyzer.load(snapshot);
        }
        None => {
            println!("Fetching options data for {currency} ...");
            block_on(async {
                analyzer.fetch(currency.as_str()).await?;
                Ok::<(), anyhow::Error>(())
            })?;
        }
    }
    Ok(analyzer)
}

/// Run the analyze command.
pub fn run(cfg: &AnalyzeConfig) -> Result<()> {
    let app = AppConfig::load(cfg.config_path.as_deref())?.with_hotspot_threshold(cfg.hotspot_threshold);
    let analyzer = prepare(&app, cfg.currency, cfg.data_dir.as_deref())?;

    println!("Generating options summary ...");
    let summary = analyzer.daily_summary()?;

    match cfg.output {
        OutputFormat::Console => console::print_summary(&summary),
        OutputFormat::Csv => {
            for p in files::write_csv_report(&summary, &cfg.output_dir)? {
                println!("Saved {}", p.display());
            }
        }
        OutputFormat::Json => {
            let p = files::write_json_report(&summary, &cfg.output_dir)?;
            println!("Saved summary data to {}", p.display());
        }
    }

    println!("Options analysis completed successfully.");
    Ok(())
}
