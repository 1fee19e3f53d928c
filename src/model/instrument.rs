use serde::{Deserialize, Serialize};

// ── Feed wire types ─────────────────────────────────────────────────
//
// Only the fields the engine reads are declared; everything else the
// exchange returns is ignored by serde.

/// Current index price of an underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPrice {
    pub index_price: f64,
}

/// Static description of one listed option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDescriptor {
    /// Exchange identifier, e.g. `BTC-27DEC24-60000-C`.
    pub instrument_name: String,
    pub strike: f64,
    /// Epoch milliseconds.
    pub expiration_timestamp: i64,
    /// Epoch milliseconds.
    pub creation_timestamp: i64,
}

/// Book summary for one option: positioning, activity and mark volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub instrument_name: String,
    #[serde(default)]
    pub open_interest: f64,
    /// Traded volume over the exchange's rolling 24h window.
    #[serde(default)]
    pub volume: Option<f64>,
    /// Absent (or null) for instruments without a quoted mark.
    #[serde(default)]
    pub mark_iv: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_ignores_extra_fields_and_null_iv() {
        let raw = r#"{
            "instrument_name": "BTC-27DEC24-60000-C",
            "open_interest": 12.5,
            "volume": null,
            "mark_iv": null,
            "underlying_price": 61000.0,
            "bid_price": 0.01
        }"#;
        let s: InstrumentSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(s.open_interest, 12.5);
        assert_eq!(s.volume, None);
        assert_eq!(s.mark_iv, None);
    }

    #[test]
    fn test_descriptor_parses_exchange_payload() {
        let raw = r#"{
            "instrument_name": "ETH-28MAR25-3000-P",
            "kind": "option",
            "option_type": "put",
            "strike": 3000.0,
            "expiration_timestamp": 1743148800000,
            "creation_timestamp": 1711612800000,
            "is_active": true
        }"#;
        let d: InstrumentDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(d.strike, 3000.0);
        assert_eq!(d.expiration_timestamp, 1_743_148_800_000);
    }
}
