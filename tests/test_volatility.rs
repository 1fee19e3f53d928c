mod chain_common;

use optchain::analytics::volatility::iv_smile;
use optchain::analytics::{AnalyticsConfig, iv_summary, skew_metrics};
use optchain::model::OptionType;

use chain_common::*;

#[test]
fn test_iv_summary_without_marks_is_no_data() {
    let snap = snapshot(vec![
        call(60_000.0, 7, 1.0, 1.0, None),
        put(55_000.0, 30, 1.0, 1.0, None),
    ]);
    let iv = iv_summary(&snap, &AnalyticsConfig::default());
    assert!(!iv.has_data());
    assert_eq!(iv.average_iv, None);
    assert_eq!(iv.min_iv, None);
    assert_eq!(iv.max_iv, None);
    assert!(iv.iv_by_expiration.is_empty());
    assert!(iv.iv_by_strike.is_empty());
}

#[test]
fn test_iv_by_expiration_ascending_and_missing_excluded() {
    let snap = snapshot(vec![
        call(60_000.0, 30, 1.0, 1.0, Some(40.0)),
        call(60_000.0, 7, 1.0, 1.0, Some(60.0)),
        put(60_000.0, 7, 1.0, 1.0, Some(80.0)),
        put(55_000.0, 7, 1.0, 1.0, None),
    ]);
    let iv = iv_summary(&snap, &AnalyticsConfig::default());
    assert_eq!(iv.average_iv, Some(60.0));
    assert_eq!(iv.iv_by_expiration.len(), 2);
    assert!(iv.iv_by_expiration[0].expiration_date < iv.iv_by_expiration[1].expiration_date);
    assert_eq!(iv.iv_by_expiration[0].value, 70.0);
    assert_eq!(iv.iv_by_expiration[1].value, 40.0);
}

#[test]
fn test_iv_by_strike_restricted_to_band() {
    let snap = snapshot(vec![
        call(71_900.0, 7, 1.0, 1.0, Some(70.0)), // inside
        call(73_000.0, 7, 1.0, 1.0, Some(90.0)), // outside
        put(48_100.0, 7, 1.0, 1.0, Some(65.0)),  // inside
        put(47_000.0, 7, 1.0, 1.0, Some(99.0)),  // outside
        call(60_000.0, 7, 1.0, 1.0, Some(50.0)),
        put(60_000.0, 30, 1.0, 1.0, Some(54.0)),
    ]);
    let iv = iv_summary(&snap, &AnalyticsConfig::default());
    let strikes: Vec<f64> = iv.iv_by_strike.iter().map(|k| k.strike).collect();
    assert_eq!(strikes, vec![48_100.0, 60_000.0, 71_900.0]);
    assert_eq!(iv.iv_by_strike[1].value, 52.0);
    // Scalars cover every marked record, not just the band.
    assert_eq!(iv.max_iv, Some(99.0));
}

#[test]
fn test_skew_metrics_per_expiry() {
    let snap = snapshot(vec![
        call(60_000.0, 7, 1.0, 1.0, Some(50.0)),
        put(60_000.0, 7, 1.0, 1.0, Some(52.0)),
        put(51_000.0, 7, 1.0, 1.0, Some(62.0)),  // OTM put wing
        call(69_000.0, 7, 1.0, 1.0, Some(55.0)), // OTM call wing
        call(60_000.0, 60, 1.0, 1.0, Some(45.0)),
    ]);
    let skew = skew_metrics(&snap, &AnalyticsConfig::default());
    assert_eq!(skew.len(), 2);

    let near = &skew[0];
    assert_eq!(near.days_to_expiration, 7);
    assert_eq!(near.atm_iv, Some(51.0));
    assert_eq!(near.otm_put_iv, Some(62.0));
    assert_eq!(near.otm_call_iv, Some(55.0));
    assert_eq!(near.skew, Some(7.0));

    let far = &skew[1];
    assert_eq!(far.atm_iv, Some(45.0));
    assert_eq!(far.otm_put_iv, None);
    assert_eq!(far.skew, None);
}

#[test]
fn test_smile_nearest_expiry_sorted() {
    let snap = snapshot(vec![
        put(65_000.0, 7, 1.0, 1.0, Some(58.0)),
        call(55_000.0, 7, 1.0, 1.0, Some(61.0)),
        call(65_000.0, 7, 1.0, 1.0, Some(57.0)),
        call(60_000.0, 30, 1.0, 1.0, Some(50.0)),
        put(60_000.0, 2, 1.0, 1.0, None),
    ]);
    let smile = iv_smile(&snap, None).unwrap();
    assert_eq!(smile.expiration_date, snap.records()[0].expiration_date);
    let pts: Vec<(f64, OptionType)> = smile.points.iter().map(|p| (p.strike, p.option_type)).collect();
    assert_eq!(
        pts,
        vec![
            (55_000.0, OptionType::Call),
            (65_000.0, OptionType::Call),
            (65_000.0, OptionType::Put),
        ]
    );

    let far = snap.records()[3].expiration_date;
    assert_eq!(iv_smile(&snap, Some(far)).unwrap().points.len(), 1);
    assert!(iv_smile(&snap, Some(date(2030, 1, 1))).is_none());
}

#[test]
fn test_smile_skips_expiry_with_only_unknown_marks() {
    let snap = snapshot(vec![
        rec("BTC-2D-60000", 60_000.0, 2, 1.0, 1.0, Some(70.0)),
        call(60_000.0, 9, 1.0, 1.0, Some(52.0)),
        put(55_000.0, 9, 1.0, 1.0, Some(58.0)),
    ]);
    let smile = iv_smile(&snap, None).unwrap();
    assert_eq!(smile.expiration_date, snap.records()[1].expiration_date);
    assert_eq!(smile.points.len(), 2);
    assert!(iv_smile(&snap, Some(snap.records()[0].expiration_date)).is_none());
}
