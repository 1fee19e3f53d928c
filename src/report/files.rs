use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::summary::TopRecord;
use crate::analytics::DailySummary;
use crate::data::file_stamp;
use crate::fetch_data::manifest::write_csv;
use crate::model::OptionType;

// ── CSV row types ────────────────────────────────────────────────────
//
// Ratios are written as plain floats; an infinite ratio round-trips as `inf`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOpenInterestRow {
    pub instrument_name: String,
    pub strike: f64,
    pub expiration_date: NaiveDate,
    pub open_interest: f64,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopVolumeRow {
    pub instrument_name: String,
    pub strike: f64,
    pub expiration_date: NaiveDate,
    pub volume: f64,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatsRow {
    pub timestamp: String,
    pub currency: String,
    pub current_price: f64,
    pub total_open_interest: f64,
    pub calls_open_interest: f64,
    pub puts_open_interest: f64,
    pub put_call_ratio: f64,
    pub total_volume: f64,
    pub calls_volume: f64,
    pub puts_volume: f64,
    pub volume_put_call_ratio: f64,
    pub average_iv: Option<f64>,
    pub min_iv: Option<f64>,
    pub max_iv: Option<f64>,
}

impl From<&DailySummary> for SummaryStatsRow {
    fn from(s: &DailySummary) -> Self {
        let oi = &s.open_interest_summary;
        let vol = &s.volume_statistics;
        let iv = &s.implied_volatility_summary;
        SummaryStatsRow {
            timestamp: s.timestamp.to_rfc3339(),
            currency: s.currency.clone(),
            current_price: s.current_price,
            total_open_interest: oi.total_open_interest,
            calls_open_interest: oi.calls_open_interest,
            puts_open_interest: oi.puts_open_interest,
            put_call_ratio: oi.put_call_ratio.into(),
            total_volume: vol.total_volume,
            calls_volume: vol.calls_volume,
            puts_volume: vol.puts_volume,
            volume_put_call_ratio: vol.volume_put_call_ratio.into(),
            average_iv: iv.average_iv,
            min_iv: iv.min_iv,
            max_iv: iv.max_iv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutCallByExpiryRow {
    pub expiration_date: NaiveDate,
    pub put_call_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighVolumeStrikeRow {
    pub strike: f64,
    pub volume: f64,
    pub distance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStatsRow {
    pub name: String,
    pub total_open_interest: f64,
    pub calls_open_interest: f64,
    pub puts_open_interest: f64,
    pub put_call_ratio: f64,
    pub total_volume: f64,
    pub calls_volume: f64,
    pub puts_volume: f64,
    pub volume_put_call_ratio: f64,
}

fn top_oi_rows(calls: &[TopRecord], puts: &[TopRecord]) -> Vec<TopOpenInterestRow> {
    let tag = |rows: &[TopRecord], option_type: OptionType| {
        rows.iter()
            .map(|r| TopOpenInterestRow {
                instrument_name: r.instrument_name.clone(),
                strike: r.strike,
                expiration_date: r.expiration_date,
                open_interest: r.value,
                option_type,
            })
            .collect::<Vec<_>>()
    };
    let mut out = tag(calls, OptionType::Call);
    out.extend(tag(puts, OptionType::Put));
    out
}

fn top_volume_rows(calls: &[TopRecord], puts: &[TopRecord]) -> Vec<TopVolumeRow> {
    let tag = |rows: &[TopRecord], option_type: OptionType| {
        rows.iter()
            .map(|r| TopVolumeRow {
                instrument_name: r.instrument_name.clone(),
                strike: r.strike,
                expiration_date: r.expiration_date,
                volume: r.value,
                option_type,
            })
            .collect::<Vec<_>>()
    };
    let mut out = tag(calls, OptionType::Call);
    out.extend(tag(puts, OptionType::Put));
    out
}

// ── Writers ──────────────────────────────────────────────────────────

/// Write the per-currency CSV set. Returns the written paths in write order.
///
/// Files are independent; a failure part-way leaves earlier files in place.
pub fn write_csv_report(summary: &DailySummary, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let stamp = file_stamp(summary.timestamp);
    let cur = &summary.currency;
    let mut written = Vec::new();
    let path_for = |kind: &str| output_dir.join(format!("{cur}_{kind}_{stamp}.csv"));

    let p = path_for("top_open_interest");
    write_csv(&p, &top_oi_rows(&summary.top_open_interest.calls, &summary.top_open_interest.puts))?;
    written.push(p);

    let p = path_for("top_volume");
    write_csv(&p, &top_volume_rows(&summary.top_volume.calls, &summary.top_volume.puts))?;
    written.push(p);

    let p = path_for("summary_stats");
    write_csv(&p, &[SummaryStatsRow::from(summary)])?;
    written.push(p);

    let analysis = &summary.open_interest_analysis;
    let p = path_for("put_call_by_expiry");
    let rows: Vec<PutCallByExpiryRow> = analysis
        .put_call_by_expiry
        .iter()
        .map(|e| PutCallByExpiryRow {
            expiration_date: e.expiration_date,
            put_call_ratio: e.put_call_ratio.into(),
        })
        .collect();
    write_csv(&p, &rows)?;
    written.push(p);

    let p = path_for("high_volume_strikes");
    let rows: Vec<HighVolumeStrikeRow> = analysis
        .high_volume_strikes
        .iter()
        .map(|h| HighVolumeStrikeRow {
            strike: h.strike,
            volume: h.volume,
            distance_pct: h.distance_pct,
        })
        .collect();
    write_csv(&p, &rows)?;
    written.push(p);

    for seg in summary.segmented_data.iter() {
        let m = &seg.summary;
        let p = path_for(&format!("{}_stats", seg.segment.key()));
        write_csv(
            &p,
            &[SegmentStatsRow {
                name: seg.name.clone(),
                total_open_interest: m.total_open_interest,
                calls_open_interest: m.calls_open_interest,
                puts_open_interest: m.puts_open_interest,
                put_call_ratio: m.put_call_ratio.into(),
                total_volume: m.total_volume,
                calls_volume: m.calls_volume,
                puts_volume: m.puts_volume,
                volume_put_call_ratio: m.volume_put_call_ratio.into(),
            }],
        )?;
        written.push(p);
    }

    let p = path_for("volatility_hotspots");
    write_csv(&p, &summary.volatility_hotspots.hotspots)?;
    written.push(p);

    for p in &written {
        tracing::info!(path = %p.display(), "wrote");
    }
    Ok(written)
}

/// Write the whole summary as pretty JSON.
pub fn write_json_report(summary: &DailySummary, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let path = output_dir.join(format!(
        "{}_options_summary_{}.json",
        summary.currency,
        file_stamp(summary.timestamp)
    ));
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote");
    Ok(path)
}
