use std::process::ExitCode;

fn main() -> ExitCode {
    match vitals_triage_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            ExitCode::FAILURE
        }
    }
}
