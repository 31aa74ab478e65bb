use serde_json::Value;

use super::parse::parse_age;
use super::types::{CategoryResult, ParsedField};

/// Oldest age (inclusive) still in the 40–65 band.
pub const MIDDLE_AGE_MAX: f64 = 65.0;

/// Band score for a parsed age: under 40 → 1, 40–65 → 1, over 65 → 2.
pub fn age_band(age: f64) -> u8 {
    if age > MIDDLE_AGE_MAX {
        2
    } else {
        1
    }
}

/// Score the raw `age` field.
pub fn score_age(raw: Option<&Value>) -> CategoryResult {
    match parse_age(raw) {
        ParsedField::Valid(a) => CategoryResult::scored(age_band(a)),
        ParsedField::Invalid => CategoryResult::invalid(),
    }
}
