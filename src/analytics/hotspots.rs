use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::mean;
use crate::model::{OptionRecord, OptionType, Snapshot};

/// An option whose mark IV stands out from its own expiry's mean IV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hotspot {
    pub instrument_name: String,
    pub expiration_date: NaiveDate,
    pub strike: f64,
    pub option_type: OptionType,
    pub implied_volatility: f64,
    /// Mean IV of the expiry cohort.
    pub mean_iv: f64,
    /// Signed `(iv - mean_iv) / mean_iv * 100`.
    pub deviation_pct: f64,
    pub days_to_expiration: i64,
    pub volume: f64,
    pub open_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, JsonSchema)]
pub struct HotspotRollup {
    pub total_hotspots: usize,
    /// Largest |deviation_pct|, 0 without hotspots.
    pub max_deviation: f64,
    /// Mean |deviation_pct|, 0 without hotspots.
    pub avg_deviation: f64,
    pub calls: usize,
    pub puts: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, JsonSchema)]
pub struct HotspotReport {
    pub threshold_pct: f64,
    /// Descending |deviation_pct|.
    pub hotspots: Vec<Hotspot>,
    pub summary: HotspotRollup,
}

/// Flag calls and puts whose IV deviates from their expiry cohort's mean by
/// at least `threshold_pct` percent.
///
/// Each expiry is normalised on its own, so a steep term structure does not
/// produce false positives. Cohorts with no IV or a zero mean are skipped.
pub fn find_hotspots(snapshot: &Snapshot, threshold_pct: f64) -> HotspotReport {
    let mut cohorts: Vec<(NaiveDate, Vec<&OptionRecord>)> = Vec::new();
    for r in snapshot.records().iter().filter(|r| r.mark_iv.is_some()) {
        match cohorts.iter_mut().find(|(d, _)| *d == r.expiration_date) {
            Some((_, members)) => members.push(r),
            None => cohorts.push((r.expiration_date, vec![r])),
        }
    }

    let mut hotspots: Vec<Hotspot> = Vec::new();
    for (_, cohort) in &cohorts {
        let mean_iv = match mean(cohort.iter().filter_map(|r| r.mark_iv)) {
            Some(m) if m != 0.0 && m.is_finite() => m,
            _ => continue,
        };
        for r in cohort.iter().filter(|r| r.is_call() || r.is_put()) {
            let Some(iv) = r.mark_iv else { continue };
            let deviation_pct = (iv - mean_iv) / mean_iv * 100.0;
            if deviation_pct.abs() >= threshold_pct {
                hotspots.push(Hotspot {
                    instrument_name: r.instrument_name.clone(),
                    expiration_date: r.expiration_date,
                    strike: r.strike,
                    option_type: r.option_type,
                    implied_volatility: iv,
                    mean_iv,
                    deviation_pct,
                    days_to_expiration: r.days_to_expiration,
                    volume: r.volume,
                    open_interest: r.open_interest,
                });
            }
        }
    }

    hotspots.sort_by(|a, b| b.deviation_pct.abs().total_cmp(&a.deviation_pct.abs()));

    let summary = HotspotRollup {
        total_hotspots: hotspots.len(),
        max_deviation: hotspots
            .iter()
            .map(|h| h.deviation_pct.abs())
            .fold(0.0, f64::max),
        avg_deviation: mean(hotspots.iter().map(|h| h.deviation_pct.abs())).unwrap_or(0.0),
        calls: hotspots.iter().filter(|h| h.option_type == OptionType::Call).count(),
        puts: hotspots.iter().filter(|h| h.option_type == OptionType::Put).count(),
    };

    HotspotReport {
        threshold_pct,
        hotspots,
        summary,
    }
}
