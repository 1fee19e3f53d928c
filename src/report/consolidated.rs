use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::files::{HighVolumeStrikeRow, PutCallByExpiryRow, SummaryStatsRow};
use super::{money, thousands};
use crate::config::Currency;
use crate::data::{FILE_STAMP_FORMAT, file_stamp, load_csv};
use crate::fetch_data::manifest::write_csv;

/// Rows shown per currency in the Markdown high-volume table.
const MARKDOWN_HIGH_VOLUME_ROWS: usize = 5;

// ── Locating inputs ─────────────────────────────────────────────────

/// One currency's CSV set from a single `analyze --output csv` run.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFiles {
    pub summary: PathBuf,
    pub high_volume: Option<PathBuf>,
    pub put_call: Option<PathBuf>,
    pub stamp: String,
}

fn stamp_of(file_name: &str, prefix: &str) -> Option<String> {
    let stamp = file_name.strip_prefix(prefix)?.strip_suffix(".csv")?;
    NaiveDateTime::parse_from_str(stamp, FILE_STAMP_FORMAT).ok()?;
    Some(stamp.to_string())
}

/// Newest summary-stats file for `currency`, optionally restricted to one
/// `YYYYMMDD` date, plus its sibling files with the same timestamp.
pub fn find_latest(output_dir: &Path, currency: Currency, date: Option<&str>) -> Result<Option<CurrencyFiles>> {
    let prefix = format!("{currency}_summary_stats_");
    let entries = std::fs::read_dir(output_dir)
        .with_context(|| format!("reading output directory {}", output_dir.display()))?;

    let mut latest: Option<String> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(stamp) = name.to_str().and_then(|n| stamp_of(n, &prefix)) else {
            continue;
        };
        if date.is_some_and(|d| !stamp.starts_with(d)) {
            continue;
        }
        // Stamps sort lexically in time order.
        if latest.as_ref().is_none_or(|l| stamp > *l) {
            latest = Some(stamp);
        }
    }

    Ok(latest.map(|stamp| {
        let sibling = |kind: &str| {
            let p = output_dir.join(format!("{currency}_{kind}_{stamp}.csv"));
            p.exists().then_some(p)
        };
        CurrencyFiles {
            summary: output_dir.join(format!("{prefix}{stamp}.csv")),
            high_volume: sibling("high_volume_strikes"),
            put_call: sibling("put_call_by_expiry"),
            stamp,
        }
    }))
}

/// Parsed contents of a [`CurrencyFiles`] set.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyData {
    pub currency: Currency,
    pub summary: SummaryStatsRow,
    pub high_volume: Option<Vec<HighVolumeStrikeRow>>,
    pub put_call: Option<Vec<PutCallByExpiryRow>>,
}

fn load_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("bad file name {}", path.display()))?;
    load_csv(dir, name)
}

impl CurrencyData {
    pub fn load(currency: Currency, files: &CurrencyFiles) -> Result<Self> {
        let mut rows: Vec<SummaryStatsRow> = load_path(&files.summary)?;
        if rows.is_empty() {
            bail!("{} has no rows", files.summary.display());
        }
        let summary = rows.swap_remove(0);

        let high_volume = match &files.high_volume {
            Some(p) => Some(load_path(p)?),
            None => None,
        };
        let put_call = match &files.put_call {
            Some(p) => Some(load_path(p)?),
            None => None,
        };
        Ok(CurrencyData {
            currency,
            summary,
            high_volume,
            put_call,
        })
    }
}

// ── Consolidated tables ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "BTC")]
    pub btc: String,
    #[serde(rename = "ETH")]
    pub eth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedHighVolumeRow {
    pub strike: f64,
    pub volume: f64,
    pub distance_pct: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedPutCallRow {
    pub expiration_date: chrono::NaiveDate,
    pub put_call_ratio: f64,
    pub currency: Currency,
}

fn ratio(v: f64) -> String {
    if v.is_infinite() { "∞".to_string() } else { format!("{v:.2}") }
}

/// Side-by-side headline metrics, already formatted for display.
pub fn consolidated_rows(btc: &SummaryStatsRow, eth: &SummaryStatsRow) -> Vec<ConsolidatedRow> {
    let metrics: [(&str, fn(&SummaryStatsRow) -> String); 9] = [
        ("Current Price", |s| money(s.current_price)),
        ("Total Open Interest", |s| thousands(s.total_open_interest)),
        ("Calls Open Interest", |s| thousands(s.calls_open_interest)),
        ("Puts Open Interest", |s| thousands(s.puts_open_interest)),
        ("Put/Call Ratio", |s| ratio(s.put_call_ratio)),
        ("Total Volume", |s| thousands(s.total_volume)),
        ("Calls Volume", |s| thousands(s.calls_volume)),
        ("Puts Volume", |s| thousands(s.puts_volume)),
        ("Volume Put/Call Ratio", |s| ratio(s.volume_put_call_ratio)),
    ];
    metrics
        .into_iter()
        .map(|(metric, f)| ConsolidatedRow {
            metric: metric.to_string(),
            btc: f(btc),
            eth: f(eth),
        })
        .collect()
}

fn combined_high_volume(btc: &CurrencyData, eth: &CurrencyData) -> Option<Vec<ConsolidatedHighVolumeRow>> {
    let (b, e) = (btc.high_volume.as_ref()?, eth.high_volume.as_ref()?);
    let tag = |rows: &[HighVolumeStrikeRow], currency| {
        rows.iter()
            .map(move |r| ConsolidatedHighVolumeRow {
                strike: r.strike,
                volume: r.volume,
                distance_pct: r.distance_pct,
                currency,
            })
            .collect::<Vec<_>>()
    };
    let mut out = tag(b, btc.currency);
    out.extend(tag(e, eth.currency));
    Some(out)
}

fn combined_put_call(btc: &CurrencyData, eth: &CurrencyData) -> Option<Vec<ConsolidatedPutCallRow>> {
    let (b, e) = (btc.put_call.as_ref()?, eth.put_call.as_ref()?);
    let tag = |rows: &[PutCallByExpiryRow], currency| {
        rows.iter()
            .map(move |r| ConsolidatedPutCallRow {
                expiration_date: r.expiration_date,
                put_call_ratio: r.put_call_ratio,
                currency,
            })
            .collect::<Vec<_>>()
    };
    let mut out = tag(b, btc.currency);
    out.extend(tag(e, eth.currency));
    Some(out)
}

/// Everything the consolidate command produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ConsolidatedRow>,
    pub high_volume: Option<Vec<ConsolidatedHighVolumeRow>>,
    pub put_call: Option<Vec<ConsolidatedPutCallRow>>,
}

impl Consolidated {
    pub fn build(btc: &CurrencyData, eth: &CurrencyData, generated_at: DateTime<Utc>) -> Self {
        Consolidated {
            generated_at,
            rows: consolidated_rows(&btc.summary, &eth.summary),
            high_volume: combined_high_volume(btc, eth),
            put_call: combined_put_call(btc, eth),
        }
    }

    /// Write the consolidated CSVs. Returns the written paths.
    pub fn write_csv(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let stamp = file_stamp(self.generated_at);
        let mut written = Vec::new();

        let p = output_dir.join(format!("consolidated_summary_{stamp}.csv"));
        write_csv(&p, &self.rows)?;
        written.push(p);

        if let Some(rows) = &self.high_volume {
            let p = output_dir.join(format!("consolidated_high_volume_{stamp}.csv"));
            write_csv(&p, rows)?;
            written.push(p);
        }
        if let Some(rows) = &self.put_call {
            let p = output_dir.join(format!("consolidated_put_call_by_expiry_{stamp}.csv"));
            write_csv(&p, rows)?;
            written.push(p);
        }
        Ok(written)
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "═".repeat(80));
        let _ = writeln!(
            out,
            "  CONSOLIDATED CRYPTO OPTIONS SUMMARY - {}",
            self.generated_at.format("%Y-%m-%d")
        );
        let _ = writeln!(out, "{}", "═".repeat(80));
        let _ = writeln!(out, "  {:<24} {:>20} {:>20}", "Metric", "BTC", "ETH");
        let _ = writeln!(out, "  {}", "-".repeat(66));
        for r in &self.rows {
            let _ = writeln!(out, "  {:<24} {:>20} {:>20}", r.metric, r.btc, r.eth);
        }
        let _ = writeln!(out, "{}", "═".repeat(80));
        out
    }

    pub fn render_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(
            md,
            "# Consolidated Crypto Options Summary - {}\n",
            self.generated_at.format("%Y-%m-%d")
        );
        let _ = writeln!(md, "## Overview\n");
        let _ = writeln!(
            md,
            "This report provides a consolidated view of options data for Bitcoin (BTC) and Ethereum (ETH).\n"
        );
        let _ = writeln!(md, "## Summary Statistics\n");
        let _ = writeln!(md, "| Metric | BTC | ETH |");
        let _ = writeln!(md, "|--------|-----|-----|");
        for r in &self.rows {
            let _ = writeln!(md, "| {} | {} | {} |", r.metric, r.btc, r.eth);
        }

        if let Some(rows) = &self.high_volume {
            let _ = writeln!(md, "\n## High Volume Strikes");
            for currency in Currency::ALL {
                let mut picked: Vec<&ConsolidatedHighVolumeRow> =
                    rows.iter().filter(|r| r.currency == currency).collect();
                picked.sort_by(|a, b| b.volume.total_cmp(&a.volume));
                let _ = writeln!(md, "\n### {currency} High Volume Strikes\n");
                let _ = writeln!(md, "| Strike | Volume | Distance from Current Price |");
                let _ = writeln!(md, "|--------|--------|----------------------------|");
                for r in picked.into_iter().take(MARKDOWN_HIGH_VOLUME_ROWS) {
                    let _ = writeln!(
                        md,
                        "| ${} | {} | {:.2}% |",
                        thousands(r.strike),
                        thousands(r.volume),
                        r.distance_pct
                    );
                }
            }
        }

        if let Some(rows) = &self.put_call {
            let _ = writeln!(md, "\n## Put/Call Ratio by Expiration");
            for currency in Currency::ALL {
                let mut picked: Vec<&ConsolidatedPutCallRow> =
                    rows.iter().filter(|r| r.currency == currency).collect();
                picked.sort_by_key(|r| r.expiration_date);
                let _ = writeln!(md, "\n### {currency} Put/Call Ratio by Expiration\n");
                let _ = writeln!(md, "| Expiration Date | Put/Call Ratio |");
                let _ = writeln!(md, "|-----------------|----------------|");
                for r in picked {
                    let _ = writeln!(md, "| {} | {} |", r.expiration_date, ratio(r.put_call_ratio));
                }
            }
        }

        let _ = writeln!(
            md,
            "\n\n---\n\nReport generated on {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        md
    }

    pub fn write_markdown(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(format!("consolidated_report_{}.md", file_stamp(self.generated_at)));
        std::fs::write(&path, self.render_markdown())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

// ── Command ─────────────────────────────────────────────────────────

/// Run the consolidate command over the latest BTC and ETH CSV sets in `output_dir`.
pub fn run(output_dir: &Path, date: Option<&str>, markdown: bool) -> Result<Consolidated> {
    let mut data = Vec::with_capacity(2);
    for currency in Currency::ALL {
        let files = find_latest(output_dir, currency, date)?.with_context(|| {
            format!(
                "no {currency} summary files in {}; run analyze --currency {currency} --output csv first",
                output_dir.display()
            )
        })?;
        tracing::info!(%currency, stamp = %files.stamp, "consolidating");
        data.push(CurrencyData::load(currency, &files)?);
    }
    let [btc, eth] = <[CurrencyData; 2]>::try_from(data)
        .map_err(|_| anyhow::anyhow!("expected exactly two currencies"))?;

    let consolidated = Consolidated::build(&btc, &eth, Utc::now());
    for p in consolidated.write_csv(output_dir)? {
        println!("Saved {}", p.display());
    }
    print!("{}", consolidated.render_table());
    if markdown {
        let p = consolidated.write_markdown(output_dir)?;
        println!("Saved markdown report to {}", p.display());
    }
    Ok(consolidated)
}
