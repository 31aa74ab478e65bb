use crate::models::PatientRecord;

use super::age::score_age;
use super::blood_pressure::score_blood_pressure;
use super::parse::parse_temperature;
use super::temperature::score_temperature;
use super::types::PatientAssessment;

/// Minimum total score for the high-risk list.
pub const HIGH_RISK_MIN_SCORE: u8 = 4;

/// Minimum parsed temperature (°F) for the fever list.
pub const FEVER_MIN_F: f64 = 99.6;

/// Score one patient across all three categories.
///
/// Invalid categories contribute zero to the total; they never stop the
/// other categories from being scored.
pub fn assess_patient(record: &PatientRecord) -> PatientAssessment {
    let blood_pressure = score_blood_pressure(record.blood_pressure.as_ref());
    let temperature = score_temperature(record.temperature.as_ref());
    let age = score_age(record.age.as_ref());

    PatientAssessment {
        patient_id: record.patient_id.clone(),
        total_score: blood_pressure.score() + temperature.score() + age.score(),
        blood_pressure,
        temperature,
        age,
        temperature_f: parse_temperature(record.temperature.as_ref()).valid(),
    }
}

pub fn assess_all(records: &[PatientRecord]) -> Vec<PatientAssessment> {
    records.iter().map(assess_patient).collect()
}

impl PatientAssessment {
    /// High risk requires a complete picture: total ≥ 4 and every category
    /// valid. A total built from partial data is not reported as high risk.
    pub fn is_high_risk(&self) -> bool {
        self.total_score >= HIGH_RISK_MIN_SCORE && self.all_valid()
    }

    /// Fever is judged on the parsed temperature alone.
    pub fn has_fever(&self) -> bool {
        self.temperature_f.is_some_and(|t| t >= FEVER_MIN_F)
    }

    pub fn has_data_quality_issue(&self) -> bool {
        !self.all_valid()
    }
}
