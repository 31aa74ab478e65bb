//! Alert report built from one batch of assessments.

pub mod submit;

pub use submit::*;

use serde::Serialize;
use thiserror::Error;

use crate::scoring::PatientAssessment;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Cannot reach submission endpoint at {0}")]
    Connection(String),

    #[error("Submission timed out: {0}")]
    Timeout(String),

    #[error("Submission rejected (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

// ---------------------------------------------------------------------------
// AssessmentReport
// ---------------------------------------------------------------------------

/// The three alert lists for one batch, in retrieval order.
///
/// Lists may overlap (a feverish patient with a malformed age is on both the
/// fever and data-quality lists). Built once; there are no mutators.
/// Serializes to exactly the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentReport {
    high_risk_patients: Vec<String>,
    fever_patients: Vec<String>,
    data_quality_issues: Vec<String>,
    #[serde(skip)]
    patients_assessed: usize,
}

impl AssessmentReport {
    pub fn from_assessments(assessments: &[PatientAssessment]) -> Self {
        let ids_where = |pred: fn(&PatientAssessment) -> bool| -> Vec<String> {
            assessments
                .iter()
                .filter(|a| pred(a))
                .map(|a| a.patient_id.clone())
                .collect()
        };

        Self {
            high_risk_patients: ids_where(PatientAssessment::is_high_risk),
            fever_patients: ids_where(PatientAssessment::has_fever),
            data_quality_issues: ids_where(PatientAssessment::has_data_quality_issue),
            patients_assessed: assessments.len(),
        }
    }

    pub fn high_risk_patients(&self) -> &[String] {
        &self.high_risk_patients
    }

    pub fn fever_patients(&self) -> &[String] {
        &self.fever_patients
    }

    pub fn data_quality_issues(&self) -> &[String] {
        &self.data_quality_issues
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            patients_assessed: self.patients_assessed,
            high_risk: self.high_risk_patients.len(),
            fever: self.fever_patients.len(),
            data_quality: self.data_quality_issues.len(),
        }
    }
}

/// Counts for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub patients_assessed: usize,
    pub high_risk: usize,
    pub fever: usize,
    pub data_quality: usize,
}
