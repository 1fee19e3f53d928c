use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::feed::OptionFeed;
use crate::analytics::crosstab::{OpenInterestAnalysis, analyze_open_interest};
use crate::analytics::hotspots::{HotspotReport, find_hotspots};
use crate::analytics::segment::{SegmentedData, segment_stats};
use crate::analytics::summary::{Summary, summarize};
use crate::analytics::volatility::{IvSummary, SkewMetrics, iv_summary, skew_metrics};
use crate::analytics::{AnalyticsConfig, AnalyticsError, DailySummary};
use crate::model::Snapshot;

/// Fetch one currency's chain from `feed` and build a snapshot at `captured_at`.
///
/// Calls run in sequence (index price, instruments, summaries); the first
/// failure aborts.
pub async fn fetch_snapshot(
    feed: &dyn OptionFeed,
    currency: &str,
    captured_at: DateTime<Utc>,
) -> Result<Snapshot> {
    let index = feed
        .index_price(currency)
        .await
        .with_context(|| format!("fetching {currency} index price from {}", feed.name()))?;
    let instruments = feed
        .option_instruments(currency)
        .await
        .with_context(|| format!("fetching {currency} option instruments from {}", feed.name()))?;
    let summaries = feed
        .option_summaries(currency)
        .await
        .with_context(|| format!("fetching {currency} option summaries from {}", feed.name()))?;

    let snapshot = Snapshot::build(
        currency,
        index.index_price,
        &instruments,
        &summaries,
        captured_at,
    )?;
    tracing::info!(
        currency = snapshot.currency(),
        spot = snapshot.spot(),
        instruments = instruments.len(),
        summaries = summaries.len(),
        records = snapshot.len(),
        "snapshot built"
    );
    Ok(snapshot)
}

/// Holds the most recent snapshot of one feed and answers queries against it.
///
/// Every query fails with [`AnalyticsError::DataUnavailable`] until
/// [`fetch`](Self::fetch) (or [`load`](Self::load)) has succeeded once.
pub struct OptionsAnalyzer<F: OptionFeed> {
    feed: F,
    config: AnalyticsConfig,
    snapshot: Option<Snapshot>,
}

impl<F: OptionFeed> OptionsAnalyzer<F> {
    pub fn new(feed: F, config: AnalyticsConfig) -> Self {
        OptionsAnalyzer {
            feed,
            config,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Replace the held snapshot with a fresh one from the feed.
    /// On failure the previous snapshot is kept.
    pub async fn fetch(&mut self, currency: &str) -> Result<&Snapshot> {
        let snapshot = fetch_snapshot(&self.feed, currency, Utc::now()).await?;
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Use an already-built snapshot (e.g. reloaded from disk).
    pub fn load(&mut self, snapshot: Snapshot) -> &Snapshot {
        self.snapshot.insert(snapshot)
    }

    pub fn snapshot(&self) -> Result<&Snapshot, AnalyticsError> {
        self.snapshot.as_ref().ok_or(AnalyticsError::DataUnavailable)
    }

    pub fn summary(&self) -> Result<Summary, AnalyticsError> {
        Ok(summarize(self.snapshot()?.records(), self.config.top_n))
    }

    pub fn open_interest_analysis(&self) -> Result<OpenInterestAnalysis, AnalyticsError> {
        Ok(analyze_open_interest(self.snapshot()?, &self.config))
    }

    pub fn segments(&self) -> Result<SegmentedData, AnalyticsError> {
        Ok(segment_stats(self.snapshot()?, &self.config))
    }

    pub fn implied_volatility(&self) -> Result<IvSummary, AnalyticsError> {
        Ok(iv_summary(self.snapshot()?, &self.config))
    }

    pub fn skew(&self) -> Result<Vec<SkewMetrics>, AnalyticsError> {
        Ok(skew_metrics(self.snapshot()?, &self.config))
    }

    /// Hotspots at `threshold_pct`, or the configured threshold when `None`.
    pub fn hotspots(&self, threshold_pct: Option<f64>) -> Result<HotspotReport, AnalyticsError> {
        let threshold = threshold_pct.unwrap_or(self.config.hotspot_threshold_pct);
        Ok(find_hotspots(self.snapshot()?, threshold))
    }

    pub fn daily_summary(&self) -> Result<DailySummary, AnalyticsError> {
        Ok(DailySummary::build(self.snapshot()?, &self.config))
    }
}
