use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use optchain::analytics::{AnalyticsConfig, AnalyticsError};
use optchain::fetch_data::analyzer::{OptionsAnalyzer, fetch_snapshot};
use optchain::fetch_data::deribit::{DEFAULT_BASE_URL, DeribitClient};
use optchain::fetch_data::feed::{FeedError, OptionFeed};
use optchain::model::{IndexPrice, InstrumentDescriptor, InstrumentSummary};

const DAY_MS: i64 = 86_400_000;

// ── Mock feed ────────────────────────────────────────────────────────

struct MockFeed {
    spot: f64,
    fail_summaries: bool,
    calls: AtomicUsize,
}

impl MockFeed {
    fn new(spot: f64) -> Self {
        MockFeed {
            spot,
            fail_summaries: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(spot: f64) -> Self {
        MockFeed {
            fail_summaries: true,
            ..MockFeed::new(spot)
        }
    }
}

fn names() -> [&'static str; 4] {
    ["BTC-A-60000-C", "BTC-A-55000-P", "BTC-B-70000-C", "BTC-B-50000-P"]
}

#[async_trait]
impl OptionFeed for MockFeed {
    async fn index_price(&self, _currency: &str) -> Result<IndexPrice, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IndexPrice {
            index_price: self.spot,
        })
    }

    async fn option_instruments(&self, _currency: &str) -> Result<Vec<InstrumentDescriptor>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now().timestamp_millis();
        Ok(names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let days = if i < 2 { 5 } else { 60 };
                InstrumentDescriptor {
                    instrument_name: name.to_string(),
                    strike: name.split('-').nth(2).unwrap().parse().unwrap(),
                    expiration_timestamp: now + days * DAY_MS,
                    creation_timestamp: now - 30 * DAY_MS,
                }
            })
            .collect())
    }

    async fn option_summaries(&self, _currency: &str) -> Result<Vec<InstrumentSummary>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summaries {
            return Err(FeedError::Api {
                message: "too_many_requests (code 10028)".to_string(),
            });
        }
        // The last instrument has no summary and is dropped.
        Ok(names()[..3]
            .iter()
            .map(|name| InstrumentSummary {
                instrument_name: name.to_string(),
                open_interest: 10.0,
                volume: Some(2.0),
                mark_iv: Some(55.0),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn test_queries_before_fetch_are_data_unavailable() {
    let analyzer = OptionsAnalyzer::new(MockFeed::new(60_000.0), AnalyticsConfig::default());
    assert!(matches!(analyzer.snapshot(), Err(AnalyticsError::DataUnavailable)));
    assert!(matches!(analyzer.summary(), Err(AnalyticsError::DataUnavailable)));
    assert!(matches!(analyzer.segments(), Err(AnalyticsError::DataUnavailable)));
    assert!(matches!(analyzer.hotspots(None), Err(AnalyticsError::DataUnavailable)));
    assert!(matches!(analyzer.daily_summary(), Err(AnalyticsError::DataUnavailable)));
}

#[tokio::test]
async fn test_fetch_builds_snapshot() {
    let mut analyzer = OptionsAnalyzer::new(MockFeed::new(60_000.0), AnalyticsConfig::default());
    let snap = analyzer.fetch("btc").await.unwrap();
    assert_eq!(snap.currency(), "BTC");
    assert_eq!(snap.len(), 3);

    let summary = analyzer.summary().unwrap();
    assert_eq!(summary.calls_open_interest, 20.0);
    assert_eq!(summary.puts_open_interest, 10.0);
    assert_eq!(summary.put_call_ratio.value(), 0.5);

    assert_eq!(analyzer.config().top_n, AnalyticsConfig::default().top_n);

    let analysis = analyzer.open_interest_analysis().unwrap();
    assert_eq!(analysis.put_call_by_expiry.len(), 2);
    assert_eq!(analysis.put_call_by_expiry[0].put_call_ratio.value(), 1.0);
    assert_eq!(analysis.put_call_by_expiry[1].put_call_ratio.value(), 0.0);

    let iv = analyzer.implied_volatility().unwrap();
    assert_eq!(iv.average_iv, Some(55.0));
    assert_eq!(iv.iv_by_expiration.len(), 2);

    let skew = analyzer.skew().unwrap();
    assert_eq!(skew.len(), 2);
    assert_eq!(skew[0].atm_iv, Some(55.0));
    assert_eq!(skew[0].otm_put_iv, Some(55.0));
    assert_eq!(skew[0].otm_call_iv, None);
    assert_eq!(skew[1].otm_call_iv, Some(55.0));

    let segments = analyzer.segments().unwrap();
    assert_eq!(segments.near_term.summary.record_count, 2);
    assert_eq!(segments.far_dated.summary.record_count, 1);

    let daily = analyzer.daily_summary().unwrap();
    assert_eq!(daily.currency, "BTC");
    assert_eq!(daily.current_price, 60_000.0);
    assert_eq!(daily.record_count, 3);
    assert!(daily.volatility_hotspots.hotspots.is_empty());
}

#[tokio::test]
async fn test_feed_error_propagates_and_keeps_previous_snapshot() {
    let feed = MockFeed::failing(60_000.0);
    let err = fetch_snapshot(&feed, "BTC", Utc::now()).await.unwrap_err();
    assert!(format!("{err:#}").contains("too_many_requests"));
    // Stops at the failing call: index price, instruments, summaries.
    assert_eq!(feed.calls.load(Ordering::SeqCst), 3);

    let mut analyzer = OptionsAnalyzer::new(MockFeed::failing(60_000.0), AnalyticsConfig::default());
    assert!(analyzer.fetch("BTC").await.is_err());
    assert!(matches!(analyzer.snapshot(), Err(AnalyticsError::DataUnavailable)));
}

#[tokio::test]
async fn test_non_positive_index_price_is_rejected() {
    let feed = MockFeed::new(0.0);
    let err = fetch_snapshot(&feed, "ETH", Utc::now()).await.unwrap_err();
    assert!(err.downcast_ref::<AnalyticsError>().is_some());
}

#[tokio::test]
async fn test_hotspot_threshold_override() {
    let mut analyzer = OptionsAnalyzer::new(MockFeed::new(60_000.0), AnalyticsConfig::default());
    analyzer.fetch("BTC").await.unwrap();
    let report = analyzer.hotspots(Some(5.0)).unwrap();
    assert_eq!(report.threshold_pct, 5.0);
    let report = analyzer.hotspots(None).unwrap();
    assert_eq!(report.threshold_pct, 20.0);
}

#[tokio::test]
#[ignore = "requires network access to the live exchange"]
async fn test_live_deribit_snapshot() {
    let client = DeribitClient::new(DEFAULT_BASE_URL, None).unwrap();
    let snap = fetch_snapshot(&client, "BTC", Utc::now()).await.unwrap();
    assert!(snap.spot() > 0.0);
    assert!(!snap.is_empty());
    assert!(snap.records().iter().all(|r| r.days_to_expiration >= 0));
}
