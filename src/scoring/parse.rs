//! Field parsers: raw JSON values from the patient service to typed readings.
//!
//! Every parser is total. Anything that is not cleanly usable comes back as
//! `ParsedField::Invalid`; nothing here returns an error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::{BloodPressure, ParsedField};

/// `<digits> / <digits>` with optional whitespace around the slash and
/// nothing else on either side.
static BLOOD_PRESSURE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*/\s*([0-9]+)$").unwrap());

/// Parse a `systolic/diastolic` string such as `"120/80"` or `"135 / 85"`.
///
/// Missing halves (`"150/"`, `"/90"`), non-numeric text, other separators,
/// non-string values and null are all invalid. Readings too large for a
/// `u32` are invalid as well.
pub fn parse_blood_pressure(raw: Option<&Value>) -> ParsedField<BloodPressure> {
    let Some(Value::String(text)) = raw else {
        return ParsedField::Invalid;
    };
    let Some(caps) = BLOOD_PRESSURE_PATTERN.captures(text) else {
        return ParsedField::Invalid;
    };

    match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
        (Ok(systolic), Ok(diastolic)) => ParsedField::Valid(BloodPressure {
            systolic,
            diastolic,
        }),
        _ => ParsedField::Invalid,
    }
}

/// Parse a temperature in °F.
pub fn parse_temperature(raw: Option<&Value>) -> ParsedField<f64> {
    coerce_number(raw).into()
}

/// Parse an age in years. Negative ages are invalid.
pub fn parse_age(raw: Option<&Value>) -> ParsedField<f64> {
    coerce_number(raw).filter(|age| *age >= 0.0).into()
}

/// Numeric coercion shared by temperature and age.
///
/// JSON numbers pass through; strings are trimmed and parsed. Blank
/// strings, booleans, containers, null and non-finite values yield `None`.
fn coerce_number(raw: Option<&Value>) -> Option<f64> {
    let number = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
