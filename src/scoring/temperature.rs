use serde_json::Value;

use super::parse::parse_temperature;
use super::types::{CategoryResult, ParsedField};

/// Highest temperature still scored as normal (°F).
pub const NORMAL_MAX_F: f64 = 99.5;

/// Lowest temperature scored as high fever (°F).
pub const HIGH_FEVER_MIN_F: f64 = 101.0;

/// Band score for a parsed temperature.
///
/// ≤99.5 → 0, ≥101.0 → 2, anything in between → 1. Readings that fall
/// between the published bands (99.55, 100.95) take the low-fever score so
/// a parsed value always has a band.
pub fn temperature_band(temp_f: f64) -> u8 {
    if temp_f <= NORMAL_MAX_F {
        0
    } else if temp_f >= HIGH_FEVER_MIN_F {
        2
    } else {
        1
    }
}

/// Score the raw `temperature` field.
pub fn score_temperature(raw: Option<&Value>) -> CategoryResult {
    match parse_temperature(raw) {
        ParsedField::Valid(t) => CategoryResult::scored(temperature_band(t)),
        ParsedField::Invalid => CategoryResult::invalid(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score(raw: Value) -> CategoryResult {
        score_temperature(Some(&raw))
    }

    #[test]
    fn normal_upper_edge() {
        assert_eq!(score(json!(99.5)), CategoryResult::scored(0));
        assert_eq!(score(json!(97.0)), CategoryResult::scored(0));
    }

    #[test]
    fn low_fever_band() {
        assert_eq!(score(json!(99.6)), CategoryResult::scored(1));
        assert_eq!(score(json!(100.9)), CategoryResult::scored(1));
    }

    #[test]
    fn high_fever_band() {
        assert_eq!(score(json!(101.0)), CategoryResult::scored(2));
        assert_eq!(score(json!(104.2)), CategoryResult::scored(2));
    }

    #[test]
    fn between_published_bands() {
        assert_eq!(temperature_band(99.55), 1);
        assert_eq!(temperature_band(100.95), 1);
    }

    #[test]
    fn numeric_strings_are_scored() {
        assert_eq!(score(json!("101.3")), CategoryResult::scored(2));
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(score(json!("TEMP_ERROR")), CategoryResult::invalid());
        assert_eq!(score(json!("")), CategoryResult::invalid());
        assert_eq!(score(Value::Null), CategoryResult::invalid());
        assert_eq!(score_temperature(None), CategoryResult::invalid());
    }
}
