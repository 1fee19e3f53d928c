mod chain_common;

use optchain::analytics::find_hotspots;
use optchain::model::OptionType;

use chain_common::*;

#[test]
fn test_three_put_cohort_has_no_hotspot_at_20pct() {
    let snap = snapshot(vec![
        put(50_000.0, 7, 1.0, 1.0, Some(0.50)),
        put(55_000.0, 7, 1.0, 1.0, Some(0.60)),
        put(60_000.0, 7, 1.0, 1.0, Some(0.70)),
    ]);
    let report = find_hotspots(&snap, 20.0);
    assert!(report.hotspots.is_empty());
    assert_eq!(report.summary.total_hotspots, 0);

    // Mean 0.60: the 0.50 put sits at -16.7%, below the threshold.
    let all = find_hotspots(&snap, 0.0);
    let low = all.hotspots.iter().find(|h| h.strike == 50_000.0).unwrap();
    assert!(approx(low.mean_iv, 0.60));
    assert!((low.deviation_pct - (-16.666666667)).abs() < 1e-6);
    assert_eq!(report.summary.max_deviation, 0.0);
    assert_eq!(report.summary.avg_deviation, 0.0);
}

#[test]
fn test_fourth_put_lowers_mean_and_becomes_hotspot() {
    let snap = snapshot(vec![
        put(50_000.0, 7, 1.0, 1.0, Some(0.50)),
        put(55_000.0, 7, 1.0, 1.0, Some(0.60)),
        put(60_000.0, 7, 1.0, 1.0, Some(0.70)),
        put(45_000.0, 7, 1.0, 1.0, Some(0.30)),
    ]);
    let report = find_hotspots(&snap, 20.0);

    let low = report
        .hotspots
        .iter()
        .find(|h| h.strike == 45_000.0)
        .expect("0.30 put should be flagged");
    assert!(approx(low.mean_iv, 0.525));
    assert!((low.deviation_pct - (-42.857142857)).abs() < 1e-6);
    // Largest |deviation| first.
    assert_eq!(report.hotspots[0].strike, 45_000.0);
    assert!(report.hotspots.iter().all(|h| h.strike != 50_000.0));
    assert_eq!(report.summary.puts, report.hotspots.len());
    assert_eq!(report.summary.calls, 0);
}

#[test]
fn test_deviation_is_against_own_expiry_mean() {
    // Global mean would be 64; each cohort is flat around its own mean.
    let snap = snapshot(vec![
        call(60_000.0, 3, 1.0, 1.0, Some(80.0)),
        put(60_000.0, 3, 1.0, 1.0, Some(80.0)),
        call(65_000.0, 3, 1.0, 1.0, Some(80.0)),
        call(60_000.0, 90, 1.0, 1.0, Some(40.0)),
        put(60_000.0, 90, 1.0, 1.0, Some(40.0)),
    ]);
    let report = find_hotspots(&snap, 20.0);
    assert!(report.hotspots.is_empty());
}

#[test]
fn test_unknown_type_counts_toward_mean_but_is_not_emitted() {
    let snap = snapshot(vec![
        call(60_000.0, 7, 1.0, 1.0, Some(50.0)),
        rec("BTC-7D-70000", 70_000.0, 7, 1.0, 1.0, Some(150.0)),
    ]);
    // Mean is 100: the call deviates -50%, the unknown +50%.
    let report = find_hotspots(&snap, 20.0);
    assert_eq!(report.hotspots.len(), 1);
    assert_eq!(report.hotspots[0].option_type, OptionType::Call);
    assert!(approx(report.hotspots[0].mean_iv, 100.0));
    assert!(approx(report.hotspots[0].deviation_pct, -50.0));
}

#[test]
fn test_zero_mean_and_missing_iv_cohorts_are_skipped() {
    let snap = snapshot(vec![
        call(60_000.0, 7, 1.0, 1.0, Some(0.0)),
        put(60_000.0, 7, 1.0, 1.0, Some(0.0)),
        call(60_000.0, 30, 1.0, 1.0, None),
        put(60_000.0, 30, 1.0, 1.0, None),
    ]);
    let report = find_hotspots(&snap, 0.0);
    assert!(report.hotspots.is_empty());
}

#[test]
fn test_threshold_is_inclusive_and_rollup() {
    let snap = snapshot(vec![
        call(60_000.0, 7, 1.0, 1.0, Some(75.0)),
        put(60_000.0, 7, 1.0, 1.0, Some(125.0)),
    ]);
    // Mean 100: both sit exactly 25% away.
    let report = find_hotspots(&snap, 25.0);
    assert_eq!(report.hotspots.len(), 2);
    assert_eq!(report.summary.total_hotspots, 2);
    assert_eq!(report.summary.calls, 1);
    assert_eq!(report.summary.puts, 1);
    assert!(approx(report.summary.max_deviation, 25.0));
    assert!(approx(report.summary.avg_deviation, 25.0));
    // Equal |deviation|: input order kept.
    assert_eq!(report.hotspots[0].option_type, OptionType::Call);
    assert!(report.hotspots[0].deviation_pct < 0.0);

    let report = find_hotspots(&snap, 25.1);
    assert!(report.hotspots.is_empty());
}
