use serde_json::Value;

use super::{AssessmentReport, SubmissionError};
use crate::retrieval::PatientApi;

/// Hand the finished report to the submission endpoint.
///
/// Returns the service's acknowledgement as-is; its contents are not
/// interpreted.
pub fn submit_report(
    api: &dyn PatientApi,
    report: &AssessmentReport,
) -> Result<Value, SubmissionError> {
    let summary = report.summary();
    tracing::info!(
        high_risk = summary.high_risk,
        fever = summary.fever,
        data_quality = summary.data_quality,
        "Submitting assessment report"
    );

    match api.submit(report) {
        Ok(ack) => {
            tracing::info!(response = %ack, "Assessment report accepted");
            Ok(ack)
        }
        Err(e) => {
            tracing::error!(error = %e, "Assessment report submission failed");
            Err(e)
        }
    }
}
