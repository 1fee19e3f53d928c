use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;

use super::ratio::Ratio;
use super::volatility::iv_stats;
use crate::model::{OptionRecord, OptionType};

// ── Building blocks ─────────────────────────────────────────────────

/// Which per-record quantity to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    OpenInterest,
    Volume,
}

impl Metric {
    pub fn of(self, record: &OptionRecord) -> f64 {
        match self {
            Metric::OpenInterest => record.open_interest,
            Metric::Volume => record.volume,
        }
    }
}

/// An aggregate attached to one strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct StrikeValue {
    pub strike: f64,
    pub value: f64,
}

/// An aggregate attached to one expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct ExpiryValue {
    pub expiration_date: NaiveDate,
    pub value: f64,
}

/// Sum `value` per `key`, keys kept in first-seen order.
pub(crate) fn group_sum<'a, K, I>(
    records: I,
    key: impl Fn(&OptionRecord) -> K,
    value: impl Fn(&OptionRecord) -> f64,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = &'a OptionRecord>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, f64)> = Vec::new();
    for r in records {
        let k = key(r);
        match index.get(&k) {
            Some(&i) => groups[i].1 += value(r),
            None => {
                index.insert(k, groups.len());
                groups.push((k, value(r)));
            }
        }
    }
    groups
}

/// Keep the `n` largest entries, descending. Ties keep their input order.
pub(crate) fn top_n<K>(mut groups: Vec<(K, f64)>, n: usize) -> Vec<(K, f64)> {
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(n);
    groups
}

/// Per-strike sums of `metric`, first-seen order.
pub(crate) fn by_strike<'a>(
    records: impl IntoIterator<Item = &'a OptionRecord>,
    metric: Metric,
) -> Vec<StrikeValue> {
    group_sum(records, |r| r.strike.to_bits(), |r| metric.of(r))
        .into_iter()
        .map(|(bits, value)| StrikeValue {
            strike: f64::from_bits(bits),
            value,
        })
        .collect()
}

/// Per-expiry sums of `metric`, first-seen order.
pub(crate) fn by_expiry<'a>(
    records: impl IntoIterator<Item = &'a OptionRecord>,
    metric: Metric,
) -> Vec<ExpiryValue> {
    group_sum(records, |r| r.expiration_date, |r| metric.of(r))
        .into_iter()
        .map(|(expiration_date, value)| ExpiryValue {
            expiration_date,
            value,
        })
        .collect()
}

fn top_strikes(records: &[&OptionRecord], metric: Metric, n: usize) -> Vec<StrikeValue> {
    let groups = by_strike(records.iter().copied(), metric)
        .into_iter()
        .map(|s| (s.strike, s.value))
        .collect();
    top_n(groups, n)
        .into_iter()
        .map(|(strike, value)| StrikeValue { strike, value })
        .collect()
}

fn top_expiries(records: &[&OptionRecord], metric: Metric, n: usize) -> Vec<ExpiryValue> {
    let groups = by_expiry(records.iter().copied(), metric)
        .into_iter()
        .map(|e| (e.expiration_date, e.value))
        .collect();
    top_n(groups, n)
        .into_iter()
        .map(|(expiration_date, value)| ExpiryValue {
            expiration_date,
            value,
        })
        .collect()
}

// ── Summary ─────────────────────────────────────────────────────────

/// Aggregate statistics over any set of option records.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Summary {
    pub record_count: usize,
    pub total_open_interest: f64,
    pub calls_open_interest: f64,
    pub puts_open_interest: f64,
    /// Open interest of records whose type could not be derived.
    pub unknown_open_interest: f64,
    pub put_call_ratio: Ratio,
    pub total_volume: f64,
    pub calls_volume: f64,
    pub puts_volume: f64,
    pub unknown_volume: f64,
    pub volume_put_call_ratio: Ratio,
    /// `None` when no record carries a mark IV.
    pub average_iv: Option<f64>,
    pub min_iv: Option<f64>,
    pub max_iv: Option<f64>,
    pub top_strikes_by_oi: Vec<StrikeValue>,
    pub top_strikes_by_volume: Vec<StrikeValue>,
    pub top_expirations_by_oi: Vec<ExpiryValue>,
    pub top_expirations_by_volume: Vec<ExpiryValue>,
}

impl Summary {
    /// Zero-valued summary for an empty segment: ratios are 0, lists empty.
    pub fn empty() -> Self {
        Summary {
            record_count: 0,
            total_open_interest: 0.0,
            calls_open_interest: 0.0,
            puts_open_interest: 0.0,
            unknown_open_interest: 0.0,
            put_call_ratio: Ratio::ZERO,
            total_volume: 0.0,
            calls_volume: 0.0,
            puts_volume: 0.0,
            unknown_volume: 0.0,
            volume_put_call_ratio: Ratio::ZERO,
            average_iv: None,
            min_iv: None,
            max_iv: None,
            top_strikes_by_oi: Vec::new(),
            top_strikes_by_volume: Vec::new(),
            top_expirations_by_oi: Vec::new(),
            top_expirations_by_volume: Vec::new(),
        }
    }
}

/// Aggregate `records`, keeping `n` entries in each top list. Put/call ratios are `+∞` whenever the call side is zero,
/// including for an empty input.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a OptionRecord>, n: usize) -> Summary {
    let records: Vec<&OptionRecord> = records.into_iter().collect();

    let mut oi = [0.0_f64; 3];
    let mut vol = [0.0_f64; 3];
    for r in &records {
        let slot = match r.option_type {
            OptionType::Call => 0,
            OptionType::Put => 1,
            OptionType::Unknown => 2,
        };
        oi[slot] += r.open_interest;
        vol[slot] += r.volume;
    }
    let [calls_oi, puts_oi, unknown_oi] = oi;
    let [calls_vol, puts_vol, unknown_vol] = vol;

    let iv = iv_stats(records.iter().copied());

    Summary {
        record_count: records.len(),
        total_open_interest: calls_oi + puts_oi + unknown_oi,
        calls_open_interest: calls_oi,
        puts_open_interest: puts_oi,
        unknown_open_interest: unknown_oi,
        put_call_ratio: Ratio::of(puts_oi, calls_oi),
        total_volume: calls_vol + puts_vol + unknown_vol,
        calls_volume: calls_vol,
        puts_volume: puts_vol,
        unknown_volume: unknown_vol,
        volume_put_call_ratio: Ratio::of(puts_vol, calls_vol),
        average_iv: iv.mean,
        min_iv: iv.min,
        max_iv: iv.max,
        top_strikes_by_oi: top_strikes(&records, Metric::OpenInterest, n),
        top_strikes_by_volume: top_strikes(&records, Metric::Volume, n),
        top_expirations_by_oi: top_expiries(&records, Metric::OpenInterest, n),
        top_expirations_by_volume: top_expiries(&records, Metric::Volume, n),
    }
}

// ── Report-facing views ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct OpenInterestSummary {
    pub total_open_interest: f64,
    pub calls_open_interest: f64,
    pub puts_open_interest: f64,
    pub unknown_open_interest: f64,
    pub put_call_ratio: Ratio,
    pub top_expirations: Vec<ExpiryValue>,
    pub top_strikes: Vec<StrikeValue>,
}

impl From<&Summary> for OpenInterestSummary {
    fn from(s: &Summary) -> Self {
        OpenInterestSummary {
            total_open_interest: s.total_open_interest,
            calls_open_interest: s.calls_open_interest,
            puts_open_interest: s.puts_open_interest,
            unknown_open_interest: s.unknown_open_interest,
            put_call_ratio: s.put_call_ratio,
            top_expirations: s.top_expirations_by_oi.clone(),
            top_strikes: s.top_strikes_by_oi.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct VolumeStatistics {
    pub total_volume: f64,
    pub calls_volume: f64,
    pub puts_volume: f64,
    pub volume_put_call_ratio: Ratio,
}

impl From<&Summary> for VolumeStatistics {
    fn from(s: &Summary) -> Self {
        VolumeStatistics {
            total_volume: s.total_volume,
            calls_volume: s.calls_volume,
            puts_volume: s.puts_volume,
            volume_put_call_ratio: s.volume_put_call_ratio,
        }
    }
}

/// One row of a top-N option table.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TopRecord {
    pub instrument_name: String,
    pub strike: f64,
    pub expiration_date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TopRecords {
    pub calls: Vec<TopRecord>,
    pub puts: Vec<TopRecord>,
}

/// The `n` calls and `n` puts with the largest `metric`, descending, ties in record order.
pub fn top_records(records: &[OptionRecord], metric: Metric, n: usize) -> TopRecords {
    let pick = |side: OptionType| -> Vec<TopRecord> {
        let mut side_records: Vec<&OptionRecord> =
            records.iter().filter(|r| r.option_type == side).collect();
        side_records.sort_by(|a, b| metric.of(b).total_cmp(&metric.of(a)));
        side_records
            .into_iter()
            .take(n)
            .map(|r| TopRecord {
                instrument_name: r.instrument_name.clone(),
                strike: r.strike,
                expiration_date: r.expiration_date,
                value: metric.of(r),
            })
            .collect()
    };
    TopRecords {
        calls: pick(OptionType::Call),
        puts: pick(OptionType::Put),
    }
}
