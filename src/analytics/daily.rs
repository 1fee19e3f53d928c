use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use super::crosstab::{OpenInterestAnalysis, OpenInterestDistribution, analyze_open_interest, open_interest_distribution};
use super::hotspots::{HotspotReport, find_hotspots};
use super::segment::{SegmentedData, segment_stats};
use super::summary::{Metric, OpenInterestSummary, TopRecords, VolumeStatistics, summarize, top_records};
use super::volatility::{IvSummary, SkewMetrics, iv_summary, skew_metrics};
use super::AnalyticsConfig;
use crate::model::Snapshot;

/// Everything the report layer needs for one currency, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DailySummary {
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub current_price: f64,
    pub record_count: usize,
    pub open_interest_summary: OpenInterestSummary,
    pub implied_volatility_summary: IvSummary,
    pub volume_statistics: VolumeStatistics,
    pub top_open_interest: TopRecords,
    pub top_volume: TopRecords,
    pub open_interest_analysis: OpenInterestAnalysis,
    pub open_interest_distribution: OpenInterestDistribution,
    pub segmented_data: SegmentedData,
    pub volatility_skew: Vec<SkewMetrics>,
    pub volatility_hotspots: HotspotReport,
}

impl DailySummary {
    pub fn build(snapshot: &Snapshot, config: &AnalyticsConfig) -> Self {
        let records = snapshot.records();
        let summary = summarize(records, config.top_n);

        tracing::debug!(
            currency = snapshot.currency(),
            records = records.len(),
            "building daily summary"
        );

        DailySummary {
            timestamp: snapshot.captured_at(),
            currency: snapshot.currency().to_string(),
            current_price: snapshot.spot(),
            record_count: summary.record_count,
            open_interest_summary: OpenInterestSummary::from(&summary),
            implied_volatility_summary: iv_summary(snapshot, config),
            volume_statistics: VolumeStatistics::from(&summary),
            top_open_interest: top_records(records, Metric::OpenInterest, config.top_n),
            top_volume: top_records(records, Metric::Volume, config.top_n),
            open_interest_analysis: analyze_open_interest(snapshot, config),
            open_interest_distribution: open_interest_distribution(snapshot, config),
            segmented_data: segment_stats(snapshot, config),
            volatility_skew: skew_metrics(snapshot, config),
            volatility_hotspots: find_hotspots(snapshot, config.hotspot_threshold_pct),
        }
    }
}
