use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{is_transient_status, RetrievalError};
use crate::config::AppConfig;
use crate::report::{AssessmentReport, SubmissionError};

/// Header carrying the service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Patient service abstraction (allows mocking).
pub trait PatientApi {
    /// Fetch one page of records. Returns the raw JSON body; envelope
    /// handling is the retriever's job.
    fn fetch_page(&self, page: u32, limit: u32) -> Result<Value, RetrievalError>;

    /// Post the final report. The response body is opaque.
    fn submit(&self, report: &AssessmentReport) -> Result<Value, SubmissionError>;
}

// ═══════════════════════════════════════════════════════════
// HTTP client
// ═══════════════════════════════════════════════════════════

/// Blocking HTTP client for the assessment service.
pub struct HttpPatientApi {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpPatientApi {
    /// Only a connect timeout is set; a slow response is waited out.
    pub fn new(
        base_url: &str,
        api_key: &str,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(None)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.base_url, &config.api_key, config.connect_timeout)
    }

    pub fn patients_url(&self) -> String {
        format!("{}/patients", self.base_url)
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit-assessment", self.base_url)
    }
}

impl PatientApi for HttpPatientApi {
    fn fetch_page(&self, page: u32, limit: u32) -> Result<Value, RetrievalError> {
        let response = self
            .client
            .get(self.patients_url())
            .query(&[("page", page), ("limit", limit)])
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RetrievalError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RetrievalError::Timeout(e.to_string())
                } else {
                    RetrievalError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if is_transient_status(status) {
            return Err(RetrievalError::Transient { status });
        }
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RetrievalError::Status { status, body });
        }

        response
            .json::<Value>()
            .map_err(|e| RetrievalError::MalformedBody(e.to_string()))
    }

    fn submit(&self, report: &AssessmentReport) -> Result<Value, SubmissionError> {
        let response = self
            .client
            .post(self.submit_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(report)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SubmissionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    SubmissionError::Timeout(e.to_string())
                } else {
                    SubmissionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SubmissionError::HttpClient(e.to_string()))?;
        if !status.is_success() {
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Opaque acknowledgement: keep JSON when it is JSON, text otherwise.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

// ═══════════════════════════════════════════════════════════
// Scripted client for tests
// ═══════════════════════════════════════════════════════════

/// In-memory patient service driven by a per-page script.
///
/// Each page holds a queue of responses consumed one per request, so a page
/// can fail a few times before succeeding. A request for a page with nothing
/// left in its queue gets a 404.
pub struct MockPatientApi {
    pages: Mutex<HashMap<u32, VecDeque<Result<Value, RetrievalError>>>>,
    requests: Mutex<Vec<(u32, u32)>>,
    submissions: Mutex<Vec<AssessmentReport>>,
    submit_failure: Option<u16>,
}

impl MockPatientApi {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            submit_failure: None,
        }
    }

    /// Queue a successful response body for `page`.
    pub fn with_page(self, page: u32, body: Value) -> Self {
        self.push(page, Ok(body))
    }

    /// Queue a failure for `page`.
    pub fn with_error(self, page: u32, error: RetrievalError) -> Self {
        self.push(page, Err(error))
    }

    /// Make every submission fail with `status`.
    pub fn with_submit_failure(mut self, status: u16) -> Self {
        self.submit_failure = Some(status);
        self
    }

    /// Pages requested so far, in order, including retries.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|(page, _)| *page).collect())
            .unwrap_or_default()
    }

    /// `limit` values sent so far.
    pub fn requested_limits(&self) -> Vec<u32> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|(_, limit)| *limit).collect())
            .unwrap_or_default()
    }

    pub fn submissions(&self) -> Vec<AssessmentReport> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn push(self, page: u32, response: Result<Value, RetrievalError>) -> Self {
        if let Ok(mut pages) = self.pages.lock() {
            pages.entry(page).or_default().push_back(response);
        }
        self
    }
}

impl Default for MockPatientApi {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientApi for MockPatientApi {
    fn fetch_page(&self, page: u32, limit: u32) -> Result<Value, RetrievalError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((page, limit));
        }
        let next = self
            .pages
            .lock()
            .ok()
            .and_then(|mut pages| pages.get_mut(&page)?.pop_front());

        next.unwrap_or_else(|| {
            Err(RetrievalError::Status {
                status: 404,
                body: format!("no scripted response for page {page}"),
            })
        })
    }

    fn submit(&self, report: &AssessmentReport) -> Result<Value, SubmissionError> {
        if let Some(status) = self.submit_failure {
            return Err(SubmissionError::Status {
                status,
                body: "scripted failure".into(),
            });
        }
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(report.clone());
        }
        Ok(serde_json::json!({ "success": true }))
    }
}
