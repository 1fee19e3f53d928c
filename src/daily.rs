use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::analytics::DailySummary;
use crate::config::{AppConfig, Currency};
use crate::fetch_data;
use crate::report::{consolidated, files};

/// Run the daily job: analyze every currency to CSV, then consolidate.
///
/// Currencies are processed one after the other; the first failure aborts
/// the run and leaves already-written files in place.
pub fn run(output_dir: &Path, markdown: bool, config_path: Option<&Path>) -> Result<()> {
    let app = AppConfig::load(config_path)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    println!("{}", "═".repeat(80));
    println!("  DAILY CRYPTO OPTIONS SUMMARY - {}", Utc::now().format("%Y-%m-%d"));
    println!("{}", "═".repeat(80));

    let steps = Currency::ALL.len() + 1;
    for (i, currency) in Currency::ALL.into_iter().enumerate() {
        println!("\nStep {}/{steps}: Collecting {currency} options data ...", i + 1);
        let snapshot = fetch_data::fetch(&app, currency)
            .with_context(|| format!("collecting {currency} data"))?;
        let summary = DailySummary::build(&snapshot, &app.analytics);
        for p in files::write_csv_report(&summary, output_dir)? {
            println!("  Saved {}", p.display());
        }
    }

    println!("\nStep {steps}/{steps}: Generating consolidated summary ...");
    consolidated::run(output_dir, None, markdown).context("generating consolidated summary")?;

    println!("\n{}", "═".repeat(80));
    println!("  Daily summary completed successfully!");
    println!("{}", "═".repeat(80));
    Ok(())
}
