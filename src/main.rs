use clap::Parser;
use tracing_subscriber::EnvFilter;

use optchain::config::Currency;
use optchain::{analyze, daily, fetch_data, hotspots, report, schema};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::Analyze {
            currency,
            output,
            output_dir,
            data_dir,
            config,
            hotspot_threshold,
        } => analyze::run(&analyze::AnalyzeConfig {
            currency,
            output,
            output_dir,
            data_dir,
            config_path: config,
            hotspot_threshold,
        }),
        cli::Command::Hotspots {
            currency,
            threshold,
            limit,
            data_dir,
            config,
        } => hotspots::run(&hotspots::HotspotsConfig {
            currency,
            threshold,
            limit,
            data_dir,
            config_path: config,
        }),
        cli::Command::FetchData {
            currency,
            output_dir,
        } => {
            let currencies = match currency {
                Some(c) => vec![c],
                None => Currency::ALL.to_vec(),
            };
            let config = optchain::config::AppConfig::load(None)?;
            fetch_data::run(&currencies, &output_dir, &config)
        }
        cli::Command::Consolidate {
            output_dir,
            date,
            markdown,
        } => report::consolidated::run(&output_dir, date.as_deref(), markdown).map(|_| ()),
        cli::Command::Daily {
            output_dir,
            no_markdown,
            config,
        } => daily::run(&output_dir, !no_markdown, config.as_deref()),
    }
}
