use chrono::{DateTime, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::instrument::{InstrumentDescriptor, InstrumentSummary};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Instrument-name marker for calls.
pub const CALL_MARKER: &str = "-C";
/// Instrument-name marker for puts.
pub const PUT_MARKER: &str = "-P";

/// Option side, derived from the instrument name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
    /// Name carries neither marker. Counted in totals, never in call/put figures.
    Unknown,
}

impl OptionType {
    pub fn from_instrument_name(name: &str) -> Self {
        if name.contains(CALL_MARKER) {
            OptionType::Call
        } else if name.contains(PUT_MARKER) {
            OptionType::Put
        } else {
            OptionType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
            OptionType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option, joined from its descriptor and its book summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub instrument_name: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration_timestamp: i64,
    pub creation_timestamp: i64,
    pub expiration_date: NaiveDate,
    pub creation_date: NaiveDate,
    /// Whole days until expiry as of capture; never negative.
    pub days_to_expiration: i64,
    pub open_interest: f64,
    pub volume: f64,
    pub mark_iv: Option<f64>,
    /// `(strike - spot) / spot * 100`.
    pub price_distance_pct: f64,
}

impl OptionRecord {
    /// Join a descriptor with its summary. `now_ms` anchors `days_to_expiration`.
    ///
    /// `None` when either timestamp lies outside the representable date range.
    pub fn from_parts(
        descriptor: &InstrumentDescriptor,
        summary: &InstrumentSummary,
        spot: f64,
        now_ms: i64,
    ) -> Option<Self> {
        Some(OptionRecord {
            instrument_name: descriptor.instrument_name.clone(),
            option_type: OptionType::from_instrument_name(&descriptor.instrument_name),
            strike: descriptor.strike,
            expiration_timestamp: descriptor.expiration_timestamp,
            creation_timestamp: descriptor.creation_timestamp,
            expiration_date: epoch_ms_to_date(descriptor.expiration_timestamp)?,
            creation_date: epoch_ms_to_date(descriptor.creation_timestamp)?,
            days_to_expiration: days_to_expiration(descriptor.expiration_timestamp, now_ms),
            open_interest: summary.open_interest,
            volume: summary.volume.unwrap_or(0.0),
            mark_iv: summary.mark_iv,
            price_distance_pct: price_distance_pct(descriptor.strike, spot),
        })
    }

    pub fn is_call(&self) -> bool {
        self.option_type == OptionType::Call
    }

    pub fn is_put(&self) -> bool {
        self.option_type == OptionType::Put
    }
}

/// UTC calendar date of an epoch-millisecond timestamp, `None` when out of range.
pub fn epoch_ms_to_date(ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

/// Rounded whole days from `now_ms` to `expiration_ms`, floored at zero.
///
/// Halves round to even, so 1.5 days → 2 and 2.5 days → 2.
pub fn days_to_expiration(expiration_ms: i64, now_ms: i64) -> i64 {
    let days = ((expiration_ms as f64 - now_ms as f64) / MS_PER_DAY).round_ties_even();
    // `as` saturates at the i64 bounds.
    (days as i64).max(0)
}

pub fn price_distance_pct(strike: f64, spot: f64) -> f64 {
    (strike - spot) / spot * 100.0
}
