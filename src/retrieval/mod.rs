//! Paginated, retrying retrieval of patient records.

pub mod client;
pub mod envelope;
pub mod paginate;

pub use client::*;
pub use envelope::*;
pub use paginate::*;

use thiserror::Error;

/// HTTP statuses the patient service uses for "try again later".
pub const TRANSIENT_STATUSES: &[u16] = &[429, 500, 503];

pub fn is_transient_status(status: u16) -> bool {
    TRANSIENT_STATUSES.contains(&status)
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Patient service temporarily unavailable (status {status})")]
    Transient { status: u16 },

    #[error("Cannot reach patient service at {0}")]
    Connection(String),

    #[error("Request to patient service timed out: {0}")]
    Timeout(String),

    #[error("Patient service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Page {page} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        last: Box<RetrievalError>,
    },
}

impl RetrievalError {
    /// Whether another attempt at the same page may succeed.
    ///
    /// Malformed bodies and non-transient statuses are final.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::Connection(_) | Self::Timeout(_)
        )
    }
}
