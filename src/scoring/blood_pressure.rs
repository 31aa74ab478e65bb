use serde_json::Value;

use super::parse::parse_blood_pressure;
use super::types::{BloodPressure, CategoryResult, ParsedField};

/// Stage of a systolic reading: <120 → 1, 120–129 → 2, 130–139 → 3, ≥140 → 4.
pub fn systolic_stage(systolic: u32) -> u8 {
    match systolic {
        0..=119 => 1,
        120..=129 => 2,
        130..=139 => 3,
        _ => 4,
    }
}

/// Stage of a diastolic reading: <80 → 1, 80–89 → 3, ≥90 → 4.
///
/// There is no stage 2 on the diastolic side; "elevated" is defined by
/// systolic alone.
pub fn diastolic_stage(diastolic: u32) -> u8 {
    match diastolic {
        0..=79 => 1,
        80..=89 => 3,
        _ => 4,
    }
}

/// The worse of the two stages.
pub fn reading_stage(reading: BloodPressure) -> u8 {
    systolic_stage(reading.systolic).max(diastolic_stage(reading.diastolic))
}

/// Score the raw `blood_pressure` field.
pub fn score_blood_pressure(raw: Option<&Value>) -> CategoryResult {
    match parse_blood_pressure(raw) {
        ParsedField::Valid(reading) => CategoryResult::scored(reading_stage(reading)),
        ParsedField::Invalid => CategoryResult::invalid(),
    }
}
