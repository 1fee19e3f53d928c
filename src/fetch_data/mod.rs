pub mod analyzer;
pub mod deribit;
pub mod feed;
pub mod manifest;

use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::{AppConfig, Currency};
use crate::data::{ManifestEntry, file_stamp};
use crate::model::Snapshot;
use deribit::DeribitClient;

/// Drive an async fetch to completion on a fresh runtime.
pub fn block_on<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    rt.block_on(fut)
}

/// Fetch a fresh snapshot of `currency` from the configured exchange.
pub fn fetch(config: &AppConfig, currency: Currency) -> Result<Snapshot> {
    let client = DeribitClient::new(&config.base_url, config.api_key.clone())
        .context("creating HTTP client")?;
    block_on(analyzer::fetch_snapshot(&client, currency.as_str(), Utc::now()))
}

/// Run the fetch-data command: fetch each currency's chain, write one CSV
/// per snapshot and record it in manifest.json.
pub fn run(currencies: &[Currency], output_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    for (i, currency) in currencies.iter().enumerate() {
        println!("[{}/{}] Fetching {currency} options ...", i + 1, currencies.len());
        let snapshot = fetch(config, *currency)?;

        let filename = format!("{currency}_snapshot_{}.csv", file_stamp(snapshot.captured_at()));
        manifest::write_csv(&output_dir.join(&filename), snapshot.records())?;
        manifest::write_manifest(
            output_dir,
            currency.as_str(),
            ManifestEntry {
                file: filename.clone(),
                spot: snapshot.spot(),
                captured_at: snapshot.captured_at(),
                records: snapshot.len(),
            },
        )?;
        println!(
            "  OK  {currency} → {filename} ({} records, spot {:.2})",
            snapshot.len(),
            snapshot.spot()
        );
    }

    println!(
        "\nDone: wrote manifest.json with {} currencies to {}",
        currencies.len(),
        output_dir.display()
    );
    Ok(())
}
