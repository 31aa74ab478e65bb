use serde_json::Value;

use super::client::PatientApi;
use super::envelope::{default_shapes, extract_records, EnvelopeShape};
use super::RetrievalError;
use crate::config::RetrievalConfig;
use crate::models::PatientRecord;

/// Outcome of walking every page.
#[derive(Debug)]
pub struct Retrieval {
    /// Records from every page that was fetched, in page order.
    pub patients: Vec<PatientRecord>,
    pub pages_fetched: u32,
    /// Set when a page failed for good and pagination stopped there.
    /// `patients` then holds only the pages before it.
    pub stopped_early: Option<RetrievalError>,
}

impl Retrieval {
    pub fn is_complete(&self) -> bool {
        self.stopped_early.is_none()
    }
}

/// Walks the patient list page by page: `page=1, 2, ...` until a short page.
///
/// Pages are strictly sequential. A page is only requested once the
/// previous one, retries included, has resolved.
pub struct PaginatedRetriever<'a> {
    api: &'a dyn PatientApi,
    config: RetrievalConfig,
    shapes: Vec<Box<dyn EnvelopeShape>>,
}

impl<'a> PaginatedRetriever<'a> {
    pub fn new(api: &'a dyn PatientApi, config: RetrievalConfig) -> Self {
        Self {
            api,
            config,
            shapes: default_shapes(),
        }
    }

    /// Replace the envelope shapes (tried in the given order).
    pub fn with_shapes(mut self, shapes: Vec<Box<dyn EnvelopeShape>>) -> Self {
        self.shapes = shapes;
        self
    }

    /// Fetch one page, retrying transient failures with linear backoff.
    ///
    /// Non-transient errors (malformed body, other statuses) are returned
    /// immediately. When every attempt fails transiently the last error is
    /// wrapped in `RetriesExhausted`.
    pub fn fetch_page_with_retry(&self, page: u32) -> Result<Value, RetrievalError> {
        let policy = self.config.retry();
        let max_attempts = policy.max_attempts();
        let mut attempt = 1;

        loop {
            match self.api.fetch_page(page, self.config.page_size()) {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    return Err(RetrievalError::RetriesExhausted {
                        page,
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        page,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Page fetch failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Fetch every page and concatenate the records.
    ///
    /// Never fails as a whole: a page that cannot be fetched ends pagination
    /// and whatever was gathered before it is returned, with the cause in
    /// `stopped_early`.
    pub fn fetch_all(&self) -> Retrieval {
        let page_size = self.config.page_size() as usize;
        let mut patients = Vec::new();
        let mut pages_fetched = 0;
        let mut page = 1;

        loop {
            let body = match self.fetch_page_with_retry(page) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!(
                        page,
                        error = %e,
                        patients = patients.len(),
                        "Failed to fetch page, returning partial results"
                    );
                    return Retrieval {
                        patients,
                        pages_fetched,
                        stopped_early: Some(e),
                    };
                }
            };
            pages_fetched += 1;

            let entries: &[Value] = match extract_records(&self.shapes, &body) {
                Some(entries) => entries,
                None => {
                    tracing::warn!(
                        page,
                        body = %body,
                        "Unknown response format, treating page as empty"
                    );
                    &[]
                }
            };

            for entry in entries {
                match PatientRecord::from_value(entry) {
                    Ok(record) => patients.push(record),
                    Err(e) => tracing::warn!(
                        page,
                        error = %e,
                        "Dropping patient record without usable identifier"
                    ),
                }
            }

            tracing::debug!(
                page,
                records = entries.len(),
                total = patients.len(),
                "Fetched patient page"
            );

            // A short page is the last page.
            if entries.len() < page_size {
                break;
            }
            page += 1;
        }

        tracing::info!(
            pages = pages_fetched,
            patients = patients.len(),
            "Retrieved all patient pages"
        );
        Retrieval {
            patients,
            pages_fetched,
            stopped_early: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use serde_json::json;

    use super::*;
    use crate::config::RetryPolicy;
    use crate::retrieval::{KeyedArray, MockPatientApi};

    const LIMIT: u32 = 20;

    fn config_with(max_attempts: u32, backoff_base: Duration) -> RetrievalConfig {
        let retry = RetryPolicy::new(max_attempts, backoff_base).unwrap();
        RetrievalConfig::new(LIMIT, retry).unwrap()
    }

    fn fast_config(max_attempts: u32) -> RetrievalConfig {
        config_with(max_attempts, Duration::from_millis(1))
    }

    /// `count` records with ids `"{prefix}-{n}"` under the given key.
    fn page_body(key: &str, prefix: &str, count: usize) -> Value {
        let records: Vec<Value> = (0..count)
            .map(|n| {
                json!({
                    "patient_id": format!("{prefix}-{n}"),
                    "blood_pressure": "120/80",
                    "temperature": 98.6,
                    "age": 40
                })
            })
            .collect();
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), Value::Array(records));
        Value::Object(body)
    }

    fn ids(retrieval: &Retrieval) -> Vec<&str> {
        retrieval.patients.iter().map(|p| p.patient_id.as_str()).collect()
    }

    #[test]
    fn concatenates_pages_until_short_page() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_page(2, page_body("data", "p2", 20))
            .with_page(3, page_body("data", "p3", 7));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(retrieval.is_complete());
        assert_eq!(retrieval.pages_fetched, 3);
        assert_eq!(retrieval.patients.len(), 47);
        assert_eq!(ids(&retrieval)[0], "p1-0");
        assert_eq!(ids(&retrieval)[20], "p2-0");
        assert_eq!(ids(&retrieval)[46], "p3-6");
        assert_eq!(api.requested_pages(), vec![1, 2, 3]);
        assert_eq!(api.requested_limits(), vec![LIMIT; 3]);
    }

    #[test]
    fn empty_final_page_terminates() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_page(2, json!({ "data": [] }));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(retrieval.is_complete());
        assert_eq!(retrieval.patients.len(), 20);
        assert_eq!(api.requested_pages(), vec![1, 2]);
    }

    #[test]
    fn mixed_envelopes_across_pages() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("patients", "p1", 20))
            .with_page(2, page_body("results", "p2", 3));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert_eq!(retrieval.patients.len(), 23);
    }

    #[test]
    fn unknown_envelope_counts_as_empty_page() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_page(2, json!({ "items": [{ "patient_id": "lost" }] }));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(retrieval.is_complete());
        assert_eq!(retrieval.pages_fetched, 2);
        assert_eq!(retrieval.patients.len(), 20);
        assert_eq!(api.requested_pages(), vec![1, 2]);
    }

    #[test]
    fn records_without_id_still_count_toward_page_length() {
        let mut body = page_body("data", "p1", 19);
        body["data"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "age": 50 }));
        let api = MockPatientApi::new()
            .with_page(1, body)
            .with_page(2, page_body("data", "p2", 1));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        // Page 1 had 20 entries, so page 2 is still requested.
        assert_eq!(api.requested_pages(), vec![1, 2]);
        assert_eq!(retrieval.patients.len(), 20);
    }

    #[test]
    fn transient_failures_then_success_loses_nothing() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_error(2, RetrievalError::Transient { status: 429 })
            .with_error(2, RetrievalError::Transient { status: 503 })
            .with_page(2, page_body("data", "p2", 5));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(retrieval.is_complete());
        assert_eq!(retrieval.patients.len(), 25);
        assert_eq!(ids(&retrieval)[20], "p2-0");
        assert_eq!(api.requested_pages(), vec![1, 2, 2, 2]);
    }

    #[test]
    fn exhausted_retries_keep_earlier_pages() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_page(2, page_body("data", "p2", 20))
            .with_error(3, RetrievalError::Transient { status: 500 })
            .with_error(3, RetrievalError::Transient { status: 500 })
            .with_error(3, RetrievalError::Transient { status: 500 })
            .with_page(3, page_body("data", "never", 5));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(!retrieval.is_complete());
        assert_eq!(retrieval.pages_fetched, 2);
        assert_eq!(retrieval.patients.len(), 40);
        assert!(matches!(
            retrieval.stopped_early,
            Some(RetrievalError::RetriesExhausted {
                page: 3,
                attempts: 3,
                ..
            })
        ));
        // Page 4 is never requested, and page 3 stops at the budget.
        assert_eq!(api.requested_pages(), vec![1, 2, 3, 3, 3]);
    }

    #[test]
    fn retries_wait_linearly_and_not_after_last_attempt() {
        let api = MockPatientApi::new()
            .with_error(1, RetrievalError::Transient { status: 503 })
            .with_error(1, RetrievalError::Transient { status: 503 })
            .with_error(1, RetrievalError::Transient { status: 503 });
        let retriever = PaginatedRetriever::new(&api, config_with(3, Duration::from_millis(100)));

        let started = Instant::now();
        let result = retriever.fetch_page_with_retry(1);
        let elapsed = started.elapsed();

        assert!(matches!(
            result,
            Err(RetrievalError::RetriesExhausted {
                page: 1,
                attempts: 3,
                ..
            })
        ));
        // 100 ms after attempt 1, 200 ms after attempt 2, nothing after 3.
        assert!(elapsed >= Duration::from_millis(300), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "waited {elapsed:?}");
        assert_eq!(api.requested_pages(), vec![1, 1, 1]);
    }

    #[test]
    fn malformed_body_is_not_retried() {
        let api = MockPatientApi::new()
            .with_page(1, page_body("data", "p1", 20))
            .with_error(2, RetrievalError::MalformedBody("expected value".into()))
            .with_page(2, page_body("data", "p2", 5));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert_eq!(retrieval.patients.len(), 20);
        assert!(matches!(
            retrieval.stopped_early,
            Some(RetrievalError::MalformedBody(_))
        ));
        assert_eq!(api.requested_pages(), vec![1, 2]);
    }

    #[test]
    fn first_page_failure_yields_empty_result() {
        let api = MockPatientApi::new().with_error(
            1,
            RetrievalError::Status {
                status: 401,
                body: "invalid api key".into(),
            },
        );

        let retrieval = PaginatedRetriever::new(&api, fast_config(3)).fetch_all();

        assert!(retrieval.patients.is_empty());
        assert_eq!(retrieval.pages_fetched, 0);
        assert!(!retrieval.is_complete());
    }

    #[test]
    fn single_attempt_policy_does_not_retry() {
        let api = MockPatientApi::new()
            .with_error(1, RetrievalError::Transient { status: 503 })
            .with_page(1, page_body("data", "p1", 2));

        let retrieval = PaginatedRetriever::new(&api, fast_config(1)).fetch_all();

        assert!(retrieval.patients.is_empty());
        assert_eq!(api.requested_pages(), vec![1]);
    }

    #[test]
    fn custom_shapes_replace_defaults() {
        let api = MockPatientApi::new().with_page(1, page_body("items", "p1", 4));

        let retrieval = PaginatedRetriever::new(&api, fast_config(3))
            .with_shapes(vec![Box::new(KeyedArray("items"))])
            .fetch_all();

        assert_eq!(retrieval.patients.len(), 4);
    }
}
