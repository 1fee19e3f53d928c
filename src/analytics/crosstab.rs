use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;

use super::ratio::Ratio;
use super::summary::{Metric, StrikeValue, by_strike, top_n};
use super::AnalyticsConfig;
use crate::model::{OptionRecord, Snapshot};

/// Dense (expiry × strike) table of a summed metric.
///
/// Axes are the expiries and strikes observed in the input. Every pair of
/// observed expiry and observed strike has a cell; pairs absent from the
/// input hold 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, JsonSchema)]
pub struct CrossTab {
    /// Row labels, ascending.
    pub expiries: Vec<NaiveDate>,
    /// Column labels, ascending.
    pub strikes: Vec<f64>,
    /// `values[i][j]` is the total for `expiries[i]` at `strikes[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn build<'a>(records: impl IntoIterator<Item = &'a OptionRecord>, metric: Metric) -> Self {
        let mut cells: BTreeMap<NaiveDate, HashMap<u64, f64>> = BTreeMap::new();
        let mut strikes: Vec<f64> = Vec::new();
        for r in records {
            *cells
                .entry(r.expiration_date)
                .or_default()
                .entry(r.strike.to_bits())
                .or_insert(0.0) += metric.of(r);
            strikes.push(r.strike);
        }
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();

        let mut expiries = Vec::with_capacity(cells.len());
        let mut values = Vec::with_capacity(cells.len());
        for (expiry, row) in cells {
            expiries.push(expiry);
            values.push(
                strikes
                    .iter()
                    .map(|s| row.get(&s.to_bits()).copied().unwrap_or(0.0))
                    .collect(),
            );
        }

        CrossTab {
            expiries,
            strikes,
            values,
        }
    }

    /// Cell value; `None` when either axis label was never observed.
    pub fn get(&self, expiry: NaiveDate, strike: f64) -> Option<f64> {
        let i = self.expiries.binary_search(&expiry).ok()?;
        let j = self
            .strikes
            .binary_search_by(|s| s.total_cmp(&strike))
            .ok()?;
        Some(self.values[i][j])
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Sum of one expiry row.
    pub fn row_total(&self, expiry: NaiveDate) -> Option<f64> {
        let i = self.expiries.binary_search(&expiry).ok()?;
        Some(self.values[i].iter().sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct ExpiryRatio {
    pub expiration_date: NaiveDate,
    pub put_call_ratio: Ratio,
}

/// A heavily traded strike and how far it sits from spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct HighVolumeStrike {
    pub strike: f64,
    pub volume: f64,
    pub distance_pct: f64,
}

/// Open-interest positioning across strikes and expiries.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct OpenInterestAnalysis {
    pub oi_by_expiry_strike: CrossTab,
    pub calls_oi_by_expiry_strike: CrossTab,
    pub puts_oi_by_expiry_strike: CrossTab,
    /// Ascending date; `inf` where the expiry has no call open interest.
    pub put_call_by_expiry: Vec<ExpiryRatio>,
    /// Ascending strike.
    pub volume_by_strike: Vec<StrikeValue>,
    /// Descending volume; candidate oversubscribed zones.
    pub high_volume_strikes: Vec<HighVolumeStrike>,
}

pub fn analyze_open_interest(snapshot: &Snapshot, config: &AnalyticsConfig) -> OpenInterestAnalysis {
    let records = snapshot.records();
    let (calls, puts) = snapshot.calls_and_puts();

    let mut volume_by_strike = by_strike(records, Metric::Volume);
    volume_by_strike.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    OpenInterestAnalysis {
        oi_by_expiry_strike: CrossTab::build(records, Metric::OpenInterest),
        calls_oi_by_expiry_strike: CrossTab::build(calls.iter().copied(), Metric::OpenInterest),
        puts_oi_by_expiry_strike: CrossTab::build(puts.iter().copied(), Metric::OpenInterest),
        put_call_by_expiry: put_call_by_expiry(records),
        volume_by_strike,
        high_volume_strikes: high_volume_strikes(records, snapshot.spot(), config.high_volume_n),
    }
}

/// Put/call open-interest ratio per expiry, ascending date.
pub fn put_call_by_expiry(records: &[OptionRecord]) -> Vec<ExpiryRatio> {
    let mut sides: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in records {
        let entry = sides.entry(r.expiration_date).or_insert((0.0, 0.0));
        if r.is_call() {
            entry.0 += r.open_interest;
        } else if r.is_put() {
            entry.1 += r.open_interest;
        }
    }
    sides
        .into_iter()
        .map(|(expiration_date, (calls, puts))| ExpiryRatio {
            expiration_date,
            put_call_ratio: Ratio::of(puts, calls),
        })
        .collect()
}

/// The `n` strikes with the most traded volume, descending, ties in first-seen order.
pub fn high_volume_strikes(records: &[OptionRecord], spot: f64, n: usize) -> Vec<HighVolumeStrike> {
    let groups = by_strike(records, Metric::Volume)
        .into_iter()
        .map(|s| (s.strike, s.value))
        .collect();
    top_n(groups, n)
        .into_iter()
        .map(|(strike, volume)| HighVolumeStrike {
            strike,
            volume,
            distance_pct: (strike - spot) / spot * 100.0,
        })
        .collect()
}

/// Calls and puts open interest per strike within `spot * (1 ± band)`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct OpenInterestDistribution {
    pub spot: f64,
    pub band: f64,
    /// Ascending strike.
    pub calls: Vec<StrikeValue>,
    /// Ascending strike.
    pub puts: Vec<StrikeValue>,
}

pub fn open_interest_distribution(snapshot: &Snapshot, config: &AnalyticsConfig) -> OpenInterestDistribution {
    let spot = snapshot.spot();
    let band = config.distribution_band;
    let (calls, puts) = snapshot.calls_and_puts();
    let side = |records: Vec<&OptionRecord>| {
        let mut v = by_strike(
            records
                .into_iter()
                .filter(|r| AnalyticsConfig::within_band(r.strike, spot, band)),
            Metric::OpenInterest,
        );
        v.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        v
    };
    OpenInterestDistribution {
        spot,
        band,
        calls: side(calls),
        puts: side(puts),
    }
}
