//! Options-chain analytics.
//!
//! Every function here takes an immutable [`Snapshot`](crate::model::Snapshot)
//! (or a slice of its records) and returns plain data; nothing is cached.

pub mod crosstab;
pub mod daily;
pub mod hotspots;
pub mod ratio;
pub mod segment;
pub mod summary;
pub mod volatility;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crosstab::{CrossTab, OpenInterestAnalysis, analyze_open_interest};
pub use daily::DailySummary;
pub use hotspots::{Hotspot, HotspotReport, find_hotspots};
pub use ratio::Ratio;
pub use segment::{Segment, SegmentStats, SegmentedData, segment, segment_stats};
pub use summary::{Metric, Summary, summarize};
pub use volatility::{IvSummary, SkewMetrics, iv_summary, skew_metrics};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("No options data available. Fetch a snapshot first.")]
    DataUnavailable,

    #[error("Index price must be a positive number, got {spot}")]
    InvalidSpot { spot: f64 },
}

/// Thresholds and bands used across the engine.
///
/// None of these are derived from market data; they are fixed per run and
/// can be overridden from a JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Last day (inclusive) of the near-term segment.
    pub near_term_max_days: i64,
    /// Last day (inclusive) of the mid-term segment.
    pub mid_term_max_days: i64,
    /// Half-width of the near-the-money band as a fraction of spot (0.20 = ±20%).
    pub iv_strike_band: f64,
    /// Half-width of the at-the-money band (0.05 = ±5%).
    pub atm_band: f64,
    /// Half-width of the strike window for the open-interest distribution.
    pub distribution_band: f64,
    /// Minimum |deviation| from the expiry mean IV, in percent, to flag a hotspot.
    pub hotspot_threshold_pct: f64,
    /// Size of top-N option, strike and expiry lists.
    pub top_n: usize,
    /// Size of the high-volume strike list.
    pub high_volume_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            near_term_max_days: 14,
            mid_term_max_days: 45,
            iv_strike_band: 0.20,
            atm_band: 0.05,
            distribution_band: 0.50,
            hotspot_threshold_pct: 20.0,
            top_n: 5,
            high_volume_n: 10,
        }
    }
}

impl AnalyticsConfig {
    /// Whether `strike` lies within `spot * (1 ± band)`, bounds inclusive.
    pub fn within_band(strike: f64, spot: f64, band: f64) -> bool {
        strike >= spot * (1.0 - band) && strike <= spot * (1.0 + band)
    }
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
