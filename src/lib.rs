pub mod batch;
pub mod config;
pub mod models;
pub mod report; // Alert lists + submission
pub mod retrieval; // Paginated retrieval with retry
pub mod scoring; // Field parsers, category scorers, aggregation

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use batch::SubmissionStatus;
use config::{AppConfig, ConfigError};
use report::SubmissionError;
use retrieval::HttpPatientApi;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("No patients retrieved: {0}")]
    NothingRetrieved(String),
}

/// Run one batch from the process environment and print the report to stdout.
pub fn run() -> Result<(), AppError> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let api = HttpPatientApi::from_config(&config)?;
    let outcome = batch::run_batch(&api, config.retrieval, config.submit);

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    if let Some(cause) = outcome.retrieved_nothing() {
        return Err(AppError::NothingRetrieved(cause.to_string()));
    }

    match outcome.submission {
        SubmissionStatus::Failed(e) => Err(e.into()),
        SubmissionStatus::Accepted(_) | SubmissionStatus::Skipped => Ok(()),
    }
}
