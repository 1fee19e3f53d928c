use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;

use super::summary::{ExpiryValue, StrikeValue};
use super::{AnalyticsConfig, mean};
use crate::model::{OptionRecord, OptionType, Snapshot};

/// Mean / min / max of mark IV over the records that carry one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct IvStats {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub(crate) fn iv_stats<'a>(records: impl IntoIterator<Item = &'a OptionRecord>) -> IvStats {
    let ivs: Vec<f64> = records.into_iter().filter_map(|r| r.mark_iv).collect();
    IvStats {
        mean: mean(ivs.iter().copied()),
        min: ivs.iter().copied().reduce(f64::min),
        max: ivs.iter().copied().reduce(f64::max),
    }
}

// ── IV summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct IvSummary {
    /// `None` means no record has a mark IV.
    pub average_iv: Option<f64>,
    pub min_iv: Option<f64>,
    pub max_iv: Option<f64>,
    /// Mean IV per expiry, ascending date.
    pub iv_by_expiration: Vec<ExpiryValue>,
    /// Mean IV per strike inside the near-the-money band, ascending strike.
    pub iv_by_strike: Vec<StrikeValue>,
}

impl IvSummary {
    pub fn has_data(&self) -> bool {
        self.average_iv.is_some()
    }
}

/// Implied-volatility statistics. Records without a mark IV are skipped, not zeroed.
pub fn iv_summary(snapshot: &Snapshot, config: &AnalyticsConfig) -> IvSummary {
    let spot = snapshot.spot();
    let with_iv: Vec<&OptionRecord> = snapshot
        .records()
        .iter()
        .filter(|r| r.mark_iv.is_some())
        .collect();

    let stats = iv_stats(with_iv.iter().copied());

    let mut by_expiry: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in &with_iv {
        by_expiry
            .entry(r.expiration_date)
            .or_default()
            .extend(r.mark_iv);
    }
    let iv_by_expiration = by_expiry
        .into_iter()
        .filter_map(|(expiration_date, ivs)| {
            mean(ivs).map(|value| ExpiryValue {
                expiration_date,
                value,
            })
        })
        .collect();

    let near: Vec<&OptionRecord> = with_iv
        .into_iter()
        .filter(|r| AnalyticsConfig::within_band(r.strike, spot, config.iv_strike_band))
        .collect();

    IvSummary {
        average_iv: stats.mean,
        min_iv: stats.min,
        max_iv: stats.max,
        iv_by_expiration,
        iv_by_strike: mean_iv_by_strike(&near),
    }
}

/// Mean IV per distinct strike, ascending strike.
fn mean_iv_by_strike(records: &[&OptionRecord]) -> Vec<StrikeValue> {
    let mut sorted: Vec<&OptionRecord> = records.to_vec();
    sorted.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    let mut out: Vec<StrikeValue> = Vec::new();
    for chunk in sorted.chunk_by(|a, b| a.strike == b.strike) {
        if let Some(value) = mean(chunk.iter().filter_map(|r| r.mark_iv)) {
            out.push(StrikeValue {
                strike: chunk[0].strike,
                value,
            });
        }
    }
    out
}

// ── Skew metrics ────────────────────────────────────────────────────

/// Shape of the smile for one expiry.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SkewMetrics {
    pub expiration_date: NaiveDate,
    pub days_to_expiration: i64,
    /// Mean IV of strikes within the at-the-money band, both sides.
    pub atm_iv: Option<f64>,
    /// Mean IV of puts between the near-the-money and at-the-money bands, below spot.
    pub otm_put_iv: Option<f64>,
    /// Mean IV of calls between the at-the-money and near-the-money bands, above spot.
    pub otm_call_iv: Option<f64>,
    /// `otm_put_iv - otm_call_iv`; positive when downside protection is bid.
    pub skew: Option<f64>,
}

/// Per-expiry ATM level and put/call wing skew, ascending date.
pub fn skew_metrics(snapshot: &Snapshot, config: &AnalyticsConfig) -> Vec<SkewMetrics> {
    let spot = snapshot.spot();
    let atm_lo = spot * (1.0 - config.atm_band);
    let atm_hi = spot * (1.0 + config.atm_band);
    let wing_lo = spot * (1.0 - config.iv_strike_band);
    let wing_hi = spot * (1.0 + config.iv_strike_band);

    let mut cohorts: BTreeMap<NaiveDate, Vec<&OptionRecord>> = BTreeMap::new();
    for r in snapshot.records().iter().filter(|r| r.mark_iv.is_some()) {
        cohorts.entry(r.expiration_date).or_default().push(r);
    }

    cohorts
        .into_iter()
        .map(|(expiration_date, cohort)| {
            let atm_iv = mean(
                cohort
                    .iter()
                    .filter(|r| r.strike >= atm_lo && r.strike <= atm_hi)
                    .filter_map(|r| r.mark_iv),
            );
            let otm_put_iv = mean(
                cohort
                    .iter()
                    .filter(|r| r.option_type == OptionType::Put)
                    .filter(|r| r.strike >= wing_lo && r.strike < atm_lo)
                    .filter_map(|r| r.mark_iv),
            );
            let otm_call_iv = mean(
                cohort
                    .iter()
                    .filter(|r| r.option_type == OptionType::Call)
                    .filter(|r| r.strike > atm_hi && r.strike <= wing_hi)
                    .filter_map(|r| r.mark_iv),
            );
            let skew = otm_put_iv.zip(otm_call_iv).map(|(p, c)| p - c);
            SkewMetrics {
                expiration_date,
                days_to_expiration: cohort.iter().map(|r| r.days_to_expiration).min().unwrap_or(0),
                atm_iv,
                otm_put_iv,
                otm_call_iv,
                skew,
            }
        })
        .collect()
}

// ── Smile ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SmilePoint {
    pub strike: f64,
    pub mark_iv: f64,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Smile {
    pub expiration_date: NaiveDate,
    /// Ascending strike; calls before puts at equal strikes.
    pub points: Vec<SmilePoint>,
}

/// IV smile of `expiry`, or of the nearest expiry with call/put IV data when `None`.
pub fn iv_smile(snapshot: &Snapshot, expiry: Option<NaiveDate>) -> Option<Smile> {
    let with_iv = snapshot
        .records()
        .iter()
        .filter(|r| r.mark_iv.is_some() && r.option_type != OptionType::Unknown);
    let expiration_date = match expiry {
        Some(d) => d,
        None => {
            with_iv
                .clone()
                .min_by_key(|r| (r.days_to_expiration, r.expiration_date))?
                .expiration_date
        }
    };

    let mut points: Vec<SmilePoint> = with_iv
        .filter(|r| r.expiration_date == expiration_date)
        .filter_map(|r| {
            r.mark_iv.map(|mark_iv| SmilePoint {
                strike: r.strike,
                mark_iv,
                option_type: r.option_type,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by(|a, b| {
        a.strike
            .total_cmp(&b.strike)
            .then_with(|| (a.option_type == OptionType::Put).cmp(&(b.option_type == OptionType::Put)))
    });
    Some(Smile {
        expiration_date,
        points,
    })
}
