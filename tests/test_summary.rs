mod chain_common;

use optchain::analytics::crosstab::{CrossTab, high_volume_strikes, put_call_by_expiry};
use optchain::analytics::summary::{Metric, top_records};
use optchain::analytics::{AnalyticsConfig, Ratio, Summary, analyze_open_interest, summarize};

use chain_common::*;

// ── Totals and ratios ────────────────────────────────────────────────

#[test]
fn test_open_interest_identity_with_unknowns() {
    let records = vec![
        call(60_000.0, 7, 10.1, 1.0, None),
        put(55_000.0, 7, 20.2, 2.0, None),
        rec("BTC-7D-60000", 60_000.0, 7, 3.3, 4.0, None),
        call(65_000.0, 30, 0.7, 0.0, None),
    ];
    let s = summarize(&records, 5);
    assert_eq!(
        s.calls_open_interest + s.puts_open_interest + s.unknown_open_interest,
        s.total_open_interest
    );
    assert_eq!(s.unknown_open_interest, 3.3);
    assert_eq!(s.unknown_volume, 4.0);
    assert_eq!(s.total_volume, 7.0);
    assert_eq!(s.record_count, 4);
}

#[test]
fn test_put_call_ratio_infinite_without_calls() {
    let records = vec![put(55_000.0, 7, 20.0, 3.0, None), put(50_000.0, 7, 5.0, 0.0, None)];
    let s = summarize(&records, 5);
    assert!(s.put_call_ratio.is_infinite());
    assert!(s.volume_put_call_ratio.is_infinite());
    assert_eq!(s.put_call_ratio.to_string(), "∞");
}

#[test]
fn test_put_call_ratio_finite() {
    let records = vec![call(60_000.0, 7, 40.0, 10.0, None), put(55_000.0, 7, 30.0, 5.0, None)];
    let s = summarize(&records, 5);
    assert_eq!(s.put_call_ratio, Ratio::of(30.0, 40.0));
    assert_eq!(s.put_call_ratio.value(), 0.75);
    assert_eq!(s.volume_put_call_ratio.value(), 0.5);
}

#[test]
fn test_summarize_empty_and_empty_summary() {
    let s = summarize(std::iter::empty(), 5);
    assert_eq!(s.total_open_interest, 0.0);
    assert!(s.put_call_ratio.is_infinite());
    assert_eq!(s.average_iv, None);
    assert!(s.top_strikes_by_oi.is_empty());

    let e = Summary::empty();
    assert_eq!(e.put_call_ratio, Ratio::ZERO);
    assert_eq!(e.record_count, 0);
}

#[test]
fn test_iv_stats_skip_missing_marks() {
    let records = vec![
        call(60_000.0, 7, 1.0, 1.0, Some(50.0)),
        put(55_000.0, 7, 1.0, 1.0, None),
        put(50_000.0, 7, 1.0, 1.0, Some(70.0)),
    ];
    let s = summarize(&records, 5);
    assert_eq!(s.average_iv, Some(60.0));
    assert_eq!(s.min_iv, Some(50.0));
    assert_eq!(s.max_iv, Some(70.0));
}

// ── Top-N ────────────────────────────────────────────────────────────

#[test]
fn test_top_strikes_ties_keep_first_seen_order() {
    let records = vec![
        call(70_000.0, 7, 5.0, 0.0, None),
        call(50_000.0, 7, 5.0, 0.0, None),
        put(60_000.0, 7, 9.0, 0.0, None),
        put(70_000.0, 7, 0.0, 0.0, None),
    ];
    let s = summarize(&records, 2);
    let strikes: Vec<f64> = s.top_strikes_by_oi.iter().map(|k| k.strike).collect();
    assert_eq!(strikes, vec![60_000.0, 70_000.0]);
    assert_eq!(s.top_strikes_by_oi[1].value, 5.0);
}

#[test]
fn test_top_records_split_by_side() {
    let records = vec![
        call(60_000.0, 7, 1.0, 8.0, None),
        call(65_000.0, 7, 3.0, 2.0, None),
        put(55_000.0, 7, 2.0, 9.0, None),
        rec("BTC-7D-60000", 60_000.0, 7, 99.0, 99.0, None),
    ];
    let top = top_records(&records, Metric::OpenInterest, 5);
    assert_eq!(top.calls.len(), 2);
    assert_eq!(top.calls[0].strike, 65_000.0);
    assert_eq!(top.puts.len(), 1);

    let top = top_records(&records, Metric::Volume, 1);
    assert_eq!(top.calls.len(), 1);
    assert_eq!(top.calls[0].value, 8.0);
}

// ── Cross-tabulation ─────────────────────────────────────────────────

#[test]
fn test_crosstab_is_dense_over_observed_axes() {
    let records = vec![
        call(60_000.0, 7, 10.0, 0.0, None),
        put(60_000.0, 7, 5.0, 0.0, None),
        call(70_000.0, 30, 2.0, 0.0, None),
    ];
    let tab = CrossTab::build(&records, Metric::OpenInterest);
    assert_eq!(tab.expiries.len(), 2);
    assert_eq!(tab.strikes, vec![60_000.0, 70_000.0]);
    assert_eq!(tab.values, vec![vec![15.0, 0.0], vec![0.0, 2.0]]);

    let near = records[0].expiration_date;
    let far = records[2].expiration_date;
    assert_eq!(tab.get(near, 70_000.0), Some(0.0));
    assert_eq!(tab.get(far, 70_000.0), Some(2.0));
    assert_eq!(tab.get(near, 80_000.0), None);
    assert_eq!(tab.row_total(near), Some(15.0));
}

#[test]
fn test_put_call_by_expiry_ascending_with_infinite() {
    let records = vec![
        put(50_000.0, 30, 4.0, 0.0, None),
        call(60_000.0, 7, 10.0, 0.0, None),
        put(60_000.0, 7, 5.0, 0.0, None),
    ];
    let by_expiry = put_call_by_expiry(&records);
    assert_eq!(by_expiry.len(), 2);
    assert!(by_expiry[0].expiration_date < by_expiry[1].expiration_date);
    assert_eq!(by_expiry[0].put_call_ratio.value(), 0.5);
    assert!(by_expiry[1].put_call_ratio.is_infinite());
}

#[test]
fn test_high_volume_strikes() {
    let records = vec![
        call(60_000.0, 7, 0.0, 10.0, None),
        put(60_000.0, 30, 0.0, 15.0, None),
        call(66_000.0, 7, 0.0, 20.0, None),
        put(54_000.0, 7, 0.0, 1.0, None),
    ];
    let top = high_volume_strikes(&records, SPOT, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].strike, 60_000.0);
    assert_eq!(top[0].volume, 25.0);
    assert_eq!(top[0].distance_pct, 0.0);
    assert!(approx(top[1].distance_pct, 10.0));
}

#[test]
fn test_open_interest_analysis_uses_config() {
    let records: Vec<_> = (0..15)
        .map(|i| call(50_000.0 + 1_000.0 * i as f64, 7, 1.0, i as f64, None))
        .collect();
    let snap = snapshot(records);
    let config = AnalyticsConfig::default();
    let analysis = analyze_open_interest(&snap, &config);
    assert_eq!(analysis.high_volume_strikes.len(), config.high_volume_n);
    assert_eq!(analysis.volume_by_strike.len(), 15);
    assert!(analysis.volume_by_strike.windows(2).all(|w| w[0].strike < w[1].strike));
    assert_eq!(analysis.puts_oi_by_expiry_strike.expiries.len(), 0);
    assert_eq!(analysis.calls_oi_by_expiry_strike.strikes.len(), 15);
}
