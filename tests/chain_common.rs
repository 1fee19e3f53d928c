#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use optchain::model::{OptionRecord, OptionType, Snapshot};
use optchain::model::record::price_distance_pct;

pub const SPOT: f64 = 60_000.0;

// ── Fixtures ─────────────────────────────────────────────────────────

pub fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Record `days` out from [`captured_at`], type taken from `name`.
pub fn rec(name: &str, strike: f64, days: i64, oi: f64, vol: f64, iv: Option<f64>) -> OptionRecord {
    let expiry = captured_at() + chrono::Duration::days(days);
    OptionRecord {
        instrument_name: name.to_string(),
        option_type: OptionType::from_instrument_name(name),
        strike,
        expiration_timestamp: expiry.timestamp_millis(),
        creation_timestamp: captured_at().timestamp_millis() - 86_400_000,
        expiration_date: expiry.date_naive(),
        creation_date: date(2025, 3, 13),
        days_to_expiration: days,
        open_interest: oi,
        volume: vol,
        mark_iv: iv,
        price_distance_pct: price_distance_pct(strike, SPOT),
    }
}

pub fn call(strike: f64, days: i64, oi: f64, vol: f64, iv: Option<f64>) -> OptionRecord {
    rec(&format!("BTC-{days}D-{strike}-C"), strike, days, oi, vol, iv)
}

pub fn put(strike: f64, days: i64, oi: f64, vol: f64, iv: Option<f64>) -> OptionRecord {
    rec(&format!("BTC-{days}D-{strike}-P"), strike, days, oi, vol, iv)
}

pub fn snapshot(records: Vec<OptionRecord>) -> Snapshot {
    Snapshot::from_records("btc", SPOT, captured_at(), records).unwrap()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("optchain-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
