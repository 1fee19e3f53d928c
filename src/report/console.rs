use std::fmt::Write;

use super::{iv_pct, money, thousands};
use crate::analytics::hotspots::HotspotReport;
use crate::analytics::summary::TopRecord;
use crate::analytics::DailySummary;

const WIDE: usize = 80;
const NARROW: usize = 40;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "─".repeat(NARROW));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "─".repeat(NARROW));
}

fn top_table(out: &mut String, title: &str, value_header: &str, rows: &[TopRecord]) {
    let _ = writeln!(out, "\n{title}:");
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    let _ = writeln!(
        out,
        "  {:<28} {:>12} {:>12} {:>14}",
        "Instrument", "Strike", "Expiration", value_header
    );
    let _ = writeln!(out, "  {}", "-".repeat(69));
    for r in rows {
        let _ = writeln!(
            out,
            "  {:<28} {:>12} {:>12} {:>14}",
            r.instrument_name,
            format!("${}", thousands(r.strike)),
            r.expiration_date,
            thousands(r.value)
        );
    }
}

/// Human-readable report of one currency's summary.
pub fn render_summary(s: &DailySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "═".repeat(WIDE));
    let _ = writeln!(
        out,
        "  OPTIONS SUMMARY FOR {} - {}",
        s.currency,
        s.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{}", "═".repeat(WIDE));
    let _ = writeln!(out, "\nCurrent Price: {}", money(s.current_price));
    let _ = writeln!(out, "Options: {}", s.record_count);

    let oi = &s.open_interest_summary;
    section(&mut out, "OPEN INTEREST SUMMARY");
    let _ = writeln!(out, "Total Open Interest: {}", thousands(oi.total_open_interest));
    let _ = writeln!(out, "Calls Open Interest: {}", thousands(oi.calls_open_interest));
    let _ = writeln!(out, "Puts Open Interest: {}", thousands(oi.puts_open_interest));
    if oi.unknown_open_interest > 0.0 {
        let _ = writeln!(out, "Unclassified Open Interest: {}", thousands(oi.unknown_open_interest));
    }
    let _ = writeln!(out, "Put/Call Ratio: {}", oi.put_call_ratio);
    let _ = writeln!(out, "\nTop Expirations by Open Interest:");
    for e in &oi.top_expirations {
        let _ = writeln!(out, "  {}: {}", e.expiration_date, thousands(e.value));
    }
    let _ = writeln!(out, "\nTop Strikes by Open Interest:");
    for k in &oi.top_strikes {
        let _ = writeln!(out, "  ${}: {}", thousands(k.strike), thousands(k.value));
    }

    let iv = &s.implied_volatility_summary;
    section(&mut out, "IMPLIED VOLATILITY SUMMARY");
    if iv.has_data() {
        let _ = writeln!(out, "Average IV: {}", iv_pct(iv.average_iv));
        let _ = writeln!(out, "Min IV: {}", iv_pct(iv.min_iv));
        let _ = writeln!(out, "Max IV: {}", iv_pct(iv.max_iv));
        let _ = writeln!(out, "\nIV by Expiration:");
        for e in &iv.iv_by_expiration {
            let _ = writeln!(out, "  {}: {}", e.expiration_date, iv_pct(Some(e.value)));
        }
    } else {
        let _ = writeln!(out, "No implied volatility data available.");
    }

    let vol = &s.volume_statistics;
    section(&mut out, "VOLUME STATISTICS");
    let _ = writeln!(out, "Total Volume: {}", thousands(vol.total_volume));
    let _ = writeln!(out, "Calls Volume: {}", thousands(vol.calls_volume));
    let _ = writeln!(out, "Puts Volume: {}", thousands(vol.puts_volume));
    let _ = writeln!(out, "Volume Put/Call Ratio: {}", vol.volume_put_call_ratio);

    section(&mut out, "EXPIRATION TIMEFRAME ANALYSIS");
    for seg in s.segmented_data.iter() {
        let m = &seg.summary;
        let _ = writeln!(out, "\n{}:", seg.name);
        let _ = writeln!(
            out,
            "  Open Interest: {} (Calls: {}, Puts: {})",
            thousands(m.total_open_interest),
            thousands(m.calls_open_interest),
            thousands(m.puts_open_interest)
        );
        let _ = writeln!(out, "  Put/Call Ratio: {}", m.put_call_ratio);
        let _ = writeln!(
            out,
            "  Volume: {} (Calls: {}, Puts: {})",
            thousands(m.total_volume),
            thousands(m.calls_volume),
            thousands(m.puts_volume)
        );
        let _ = writeln!(out, "  Volume Put/Call Ratio: {}", m.volume_put_call_ratio);
        if !m.top_strikes_by_oi.is_empty() {
            let _ = writeln!(out, "  Top Strikes by Open Interest:");
            for k in &m.top_strikes_by_oi {
                let _ = writeln!(out, "    ${}: {}", thousands(k.strike), thousands(k.value));
            }
        }
    }

    section(&mut out, "HIGH VOLUME STRIKES (POTENTIAL OVERSUBSCRIBED ZONES)");
    let _ = writeln!(out, "  {:>12} {:>14} {:>28}", "Strike", "Volume", "Distance from Current Price");
    let _ = writeln!(out, "  {}", "-".repeat(56));
    for h in &s.open_interest_analysis.high_volume_strikes {
        let _ = writeln!(
            out,
            "  {:>12} {:>14} {:>27.2}%",
            format!("${}", thousands(h.strike)),
            thousands(h.volume),
            h.distance_pct
        );
    }

    section(&mut out, "PUT/CALL RATIO BY EXPIRATION");
    let _ = writeln!(out, "  {:<16} {:>14}", "Expiration Date", "Put/Call Ratio");
    let _ = writeln!(out, "  {}", "-".repeat(31));
    for e in &s.open_interest_analysis.put_call_by_expiry {
        let _ = writeln!(out, "  {:<16} {:>14}", e.expiration_date.to_string(), e.put_call_ratio.to_string());
    }

    if !s.volatility_skew.is_empty() {
        section(&mut out, "VOLATILITY SKEW BY EXPIRATION");
        let _ = writeln!(
            out,
            "  {:<12} {:>5} {:>10} {:>10} {:>10} {:>10}",
            "Expiration", "Days", "ATM IV", "OTM Put", "OTM Call", "Skew"
        );
        let _ = writeln!(out, "  {}", "-".repeat(62));
        for k in &s.volatility_skew {
            let _ = writeln!(
                out,
                "  {:<12} {:>5} {:>10} {:>10} {:>10} {:>10}",
                k.expiration_date.to_string(),
                k.days_to_expiration,
                iv_pct(k.atm_iv),
                iv_pct(k.otm_put_iv),
                iv_pct(k.otm_call_iv),
                k.skew.map(|v| format!("{v:+.2}")).unwrap_or_else(|| "n/a".to_string())
            );
        }
    }

    section(&mut out, "TOP OPTIONS BY OPEN INTEREST");
    top_table(&mut out, "Top Calls by Open Interest", "Open Interest", &s.top_open_interest.calls);
    top_table(&mut out, "Top Puts by Open Interest", "Open Interest", &s.top_open_interest.puts);

    section(&mut out, "TOP OPTIONS BY VOLUME");
    top_table(&mut out, "Top Calls by Volume", "Volume", &s.top_volume.calls);
    top_table(&mut out, "Top Puts by Volume", "Volume", &s.top_volume.puts);

    let hs = &s.volatility_hotspots.summary;
    section(&mut out, "VOLATILITY HOTSPOTS");
    let _ = writeln!(
        out,
        "{} options deviate ≥{:.0}% from their expiry's mean IV ({} calls, {} puts)",
        hs.total_hotspots, s.volatility_hotspots.threshold_pct, hs.calls, hs.puts
    );

    let _ = writeln!(out, "\n{}", "═".repeat(WIDE));
    out
}

pub fn print_summary(summary: &DailySummary) {
    print!("{}", render_summary(summary));
}

/// Hotspot table, at most `limit` rows.
pub fn render_hotspots(currency: &str, report: &HotspotReport, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "═".repeat(104));
    let _ = writeln!(
        out,
        "  {currency} Volatility Hotspots (|deviation| ≥ {:.1}% of expiry mean IV)",
        report.threshold_pct
    );
    let _ = writeln!(out, "{}", "═".repeat(104));

    if report.hotspots.is_empty() {
        let _ = writeln!(out, "  No hotspots found.");
        let _ = writeln!(out, "{}", "═".repeat(104));
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<28} {:<5} {:>12} {:>5} {:>9} {:>9} {:>9} {:>10}",
        "Instrument", "Type", "Strike", "Days", "IV", "Mean IV", "Dev%", "OI"
    );
    let _ = writeln!(out, "  {}", "-".repeat(98));
    for h in report.hotspots.iter().take(limit) {
        let _ = writeln!(
            out,
            "  {:<28} {:<5} {:>12} {:>5} {:>9.2} {:>9.2} {:>+9.1} {:>10}",
            h.instrument_name,
            h.option_type.as_str(),
            thousands(h.strike),
            h.days_to_expiration,
            h.implied_volatility,
            h.mean_iv,
            h.deviation_pct,
            thousands(h.open_interest)
        );
    }
    let _ = writeln!(out, "{}", "═".repeat(104));
    let s = &report.summary;
    let _ = writeln!(
        out,
        "  {} hotspots ({} calls, {} puts), max |dev| {:.1}%, mean |dev| {:.1}%",
        s.total_hotspots, s.calls, s.puts, s.max_deviation, s.avg_deviation
    );
    if report.hotspots.len() > limit {
        let _ = writeln!(out, "  ({} more not shown)", report.hotspots.len() - limit);
    }
    out
}

pub fn print_hotspots(currency: &str, report: &HotspotReport, limit: usize) {
    print!("{}", render_hotspots(currency, report, limit));
}
