//! Rendering of [`DailySummary`](crate::analytics::DailySummary) for people
//! (console, Markdown) and for other tools (CSV, JSON).

pub mod console;
pub mod consolidated;
pub mod files;

/// `1234567.4` → `"1,234,567"`.
pub fn thousands(value: f64) -> String {
    with_separators(value, 0)
}

/// `64250.5` → `"$64,250.50"`.
pub fn money(value: f64) -> String {
    format!("${}", with_separators(value, 2))
}

/// Format with `decimals` places and a comma every three integer digits.
pub fn with_separators(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "∞".to_string()
        } else {
            "-∞".to_string()
        };
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Mark IV as quoted by the exchange (already in percent), or `"n/a"`.
pub fn iv_pct(iv: Option<f64>) -> String {
    match iv {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(1234567.4), "1,234,567");
        assert_eq!(thousands(-1234.0), "-1,234");
        assert_eq!(thousands(-0.2), "0");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(64250.5), "$64,250.50");
        assert_eq!(money(3100.0), "$3,100.00");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(thousands(f64::INFINITY), "∞");
        assert_eq!(iv_pct(None), "n/a");
        assert_eq!(iv_pct(Some(55.123)), "55.12%");
    }
}
