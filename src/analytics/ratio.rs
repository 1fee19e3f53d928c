use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Serialize, Serializer};

/// A put/call style ratio.
///
/// Division by a zero denominator is not an error: the ratio is `+∞`.
/// JSON and CSV carry it as the string `"inf"`; `Display` renders `∞`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);
    pub const INFINITE: Ratio = Ratio(f64::INFINITY);

    /// `numerator / denominator`, or `+∞` when the denominator is not positive.
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Ratio(numerator / denominator)
        } else {
            Ratio::INFINITE
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }
}

impl From<Ratio> for f64 {
    fn from(r: Ratio) -> f64 {
        r.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            f.pad("∞")
        } else if f.precision().is_some() {
            fmt::Display::fmt(&self.0, f)
        } else {
            f.pad(&format!("{:.2}", self.0))
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_str("inf")
        }
    }
}

impl JsonSchema for Ratio {
    fn schema_name() -> Cow<'static, str> {
        "Ratio".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "Non-negative ratio; the string \"inf\" when the denominator is zero.",
            "oneOf": [
                { "type": "number", "minimum": 0 },
                { "const": "inf" }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_is_infinite() {
        assert!(Ratio::of(100.0, 0.0).is_infinite());
        assert!(Ratio::of(0.0, 0.0).is_infinite());
        assert_eq!(Ratio::of(50.0, 100.0).value(), 0.5);
    }

    #[test]
    fn test_display_and_json() {
        assert_eq!(Ratio::of(1.0, 3.0).to_string(), "0.33");
        assert_eq!(format!("{:.3}", Ratio::of(1.0, 3.0)), "0.333");
        assert_eq!(Ratio::INFINITE.to_string(), "∞");
        assert_eq!(serde_json::to_string(&Ratio::INFINITE).unwrap(), "\"inf\"");
        assert_eq!(serde_json::to_string(&Ratio::of(3.0, 2.0)).unwrap(), "1.5");
    }
}
