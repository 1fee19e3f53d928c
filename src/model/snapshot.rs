use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::instrument::{InstrumentDescriptor, InstrumentSummary};
use super::record::{OptionRecord, OptionType};
use crate::analytics::AnalyticsError;

/// All option records of one currency, captured at one instant.
///
/// Built once per fetch and never mutated; every statistic is a pure
/// function of a `&Snapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    currency: String,
    spot: f64,
    captured_at: DateTime<Utc>,
    records: Vec<OptionRecord>,
}

impl Snapshot {
    /// Merge feed payloads into a snapshot anchored at `captured_at`.
    pub fn build(
        currency: &str,
        spot: f64,
        instruments: &[InstrumentDescriptor],
        summaries: &[InstrumentSummary],
        captured_at: DateTime<Utc>,
    ) -> Result<Self, AnalyticsError> {
        check_spot(spot)?;
        let records = merge_records(instruments, summaries, spot, captured_at.timestamp_millis());
        Self::from_records(currency, spot, captured_at, records)
    }

    /// Wrap already-derived records (e.g. reloaded from disk).
    pub fn from_records(
        currency: &str,
        spot: f64,
        captured_at: DateTime<Utc>,
        records: Vec<OptionRecord>,
    ) -> Result<Self, AnalyticsError> {
        check_spot(spot)?;
        let unknown = records
            .iter()
            .filter(|r| r.option_type == OptionType::Unknown)
            .count();
        if unknown > 0 {
            tracing::warn!(
                currency,
                unknown,
                "instruments without a call/put marker; counted in totals only"
            );
        }
        Ok(Snapshot {
            currency: currency.to_uppercase(),
            spot,
            captured_at,
            records,
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn records(&self) -> &[OptionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct expiration dates, ascending.
    pub fn expiration_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.expiration_date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// Distinct strikes, ascending.
    pub fn strikes(&self) -> Vec<f64> {
        let mut strikes: Vec<f64> = self.records.iter().map(|r| r.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        strikes
    }

    pub fn by_expiration(&self, date: NaiveDate) -> Vec<&OptionRecord> {
        self.records
            .iter()
            .filter(|r| r.expiration_date == date)
            .collect()
    }

    pub fn by_strike(&self, strike: f64) -> Vec<&OptionRecord> {
        self.records.iter().filter(|r| r.strike == strike).collect()
    }

    pub fn calls_and_puts(&self) -> (Vec<&OptionRecord>, Vec<&OptionRecord>) {
        let calls = self.records.iter().filter(|r| r.is_call()).collect();
        let puts = self.records.iter().filter(|r| r.is_put()).collect();
        (calls, puts)
    }
}

fn check_spot(spot: f64) -> Result<(), AnalyticsError> {
    if spot.is_finite() && spot > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidSpot { spot })
    }
}

/// Left-join descriptors with summaries on `instrument_name`.
///
/// Descriptor order is preserved. Descriptors without a summary are dropped;
/// if the feed repeats a summary, the last one wins.
pub fn merge_records(
    instruments: &[InstrumentDescriptor],
    summaries: &[InstrumentSummary],
    spot: f64,
    now_ms: i64,
) -> Vec<OptionRecord> {
    let by_name: HashMap<&str, &InstrumentSummary> = summaries
        .iter()
        .map(|s| (s.instrument_name.as_str(), s))
        .collect();

    let mut unmatched = 0usize;
    let mut out_of_range = 0usize;
    let mut records = Vec::with_capacity(instruments.len());
    for d in instruments {
        let Some(s) = by_name.get(d.instrument_name.as_str()) else {
            unmatched += 1;
            continue;
        };
        match OptionRecord::from_parts(d, s, spot, now_ms) {
            Some(r) => records.push(r),
            None => out_of_range += 1,
        }
    }

    if unmatched > 0 {
        tracing::debug!(dropped = unmatched, "descriptors without a book summary");
    }
    if out_of_range > 0 {
        tracing::warn!(dropped = out_of_range, "descriptors with out-of-range timestamps");
    }
    records
}
