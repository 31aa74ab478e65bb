//! One batch pass: retrieve → score → report → (optionally) submit.

use serde_json::Value;

use crate::config::RetrievalConfig;
use crate::report::{submit_report, AssessmentReport, SubmissionError};
use crate::retrieval::{PaginatedRetriever, PatientApi, Retrieval, RetrievalError};
use crate::scoring::{assess_all, PatientAssessment};

/// What happened to the report after it was built.
#[derive(Debug)]
pub enum SubmissionStatus {
    /// Dry run: the report was built but not posted.
    Skipped,
    Accepted(Value),
    Failed(SubmissionError),
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub retrieval: Retrieval,
    pub assessments: Vec<PatientAssessment>,
    pub report: AssessmentReport,
    pub submission: SubmissionStatus,
}

impl BatchOutcome {
    /// The failure that stopped retrieval before any patient came back.
    ///
    /// `None` when at least one patient was retrieved, or when the service
    /// simply has no patients.
    pub fn retrieved_nothing(&self) -> Option<&RetrievalError> {
        if self.retrieval.patients.is_empty() {
            self.retrieval.stopped_early.as_ref()
        } else {
            None
        }
    }
}

/// Run one batch against `api`.
///
/// A partial retrieval still produces (and, if asked, submits) a report for
/// the patients that were retrieved; `outcome.retrieval.stopped_early`
/// records why it is partial. When retrieval failed before any patient came
/// back the empty report is never submitted.
pub fn run_batch(api: &dyn PatientApi, config: RetrievalConfig, submit: bool) -> BatchOutcome {
    let page_size = config.page_size();
    let _span = tracing::info_span!("run_batch", page_size, submit).entered();

    let retrieval = PaginatedRetriever::new(api, config).fetch_all();
    tracing::info!(patients = retrieval.patients.len(), "All patient count");
    if let Some(e) = &retrieval.stopped_early {
        tracing::warn!(error = %e, "Report is built from partial data");
    }

    let assessments = assess_all(&retrieval.patients);
    for a in assessments.iter().filter(|a| a.has_data_quality_issue()) {
        let invalid: Vec<&str> = a.invalid_categories().iter().map(|c| c.as_str()).collect();
        tracing::debug!(patient_id = %a.patient_id, invalid = ?invalid, "Data quality issue");
    }

    let report = AssessmentReport::from_assessments(&assessments);
    let summary = report.summary();
    tracing::info!(
        assessed = summary.patients_assessed,
        high_risk = summary.high_risk,
        fever = summary.fever,
        data_quality = summary.data_quality,
        "Assessment report built"
    );

    let mut outcome = BatchOutcome {
        retrieval,
        assessments,
        report,
        submission: SubmissionStatus::Skipped,
    };

    if !submit {
        tracing::info!("Submission disabled, skipping");
    } else if let Some(e) = outcome.retrieved_nothing() {
        tracing::warn!(error = %e, "No patients retrieved, skipping submission");
    } else {
        outcome.submission = match submit_report(api, &outcome.report) {
            Ok(ack) => SubmissionStatus::Accepted(ack),
            Err(e) => SubmissionStatus::Failed(e),
        };
    }

    outcome
}
