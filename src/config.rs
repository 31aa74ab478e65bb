use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "vitals-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Assessment service root; `/patients` and `/submit-assessment` hang off it.
pub const DEFAULT_BASE_URL: &str = "https://assessment.ksensetech.com/api";

/// Records requested per page. A shorter page marks the last one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Total attempts per page (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff unit; the n-th retry waits `n * DEFAULT_BACKOFF_MS`.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_KEY: &str = "TRIAGE_API_KEY";
pub const ENV_BASE_URL: &str = "TRIAGE_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "TRIAGE_PAGE_SIZE";
pub const ENV_MAX_ATTEMPTS: &str = "TRIAGE_MAX_ATTEMPTS";
pub const ENV_BACKOFF_MS: &str = "TRIAGE_BACKOFF_MS";
pub const ENV_SUBMIT: &str = "TRIAGE_SUBMIT";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,vitals_triage_lib=debug"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Page size must be at least 1")]
    ZeroPageSize,

    #[error("Retry policy needs at least one attempt")]
    ZeroAttempts,
}

// ═══════════════════════════════════════════════════════════
// Retrieval settings
// ═══════════════════════════════════════════════════════════

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            backoff_base,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

/// Paging and retry settings handed to the retriever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    page_size: u32,
    retry: RetryPolicy,
}

impl RetrievalConfig {
    pub fn new(page_size: u32, retry: RetryPolicy) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(Self { page_size, retry })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Process configuration
// ═══════════════════════════════════════════════════════════

/// Everything the binary needs for one batch run.
#[derive(Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
    pub retrieval: RetrievalConfig,
    pub connect_timeout: Duration,
    /// Post the report when true; otherwise the run is a dry run.
    pub submit: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("retrieval", &self.retrieval)
            .field("connect_timeout", &self.connect_timeout)
            .field("submit", &self.submit)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingVar(ENV_API_KEY))?;

        let base_url = lookup(ENV_BASE_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let page_size = parse_var(&lookup, ENV_PAGE_SIZE, DEFAULT_PAGE_SIZE)?;
        let max_attempts = parse_var(&lookup, ENV_MAX_ATTEMPTS, DEFAULT_MAX_ATTEMPTS)?;
        let backoff_ms = parse_var(&lookup, ENV_BACKOFF_MS, DEFAULT_BACKOFF_MS)?;
        let retry = RetryPolicy::new(max_attempts, Duration::from_millis(backoff_ms))?;

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            retrieval: RetrievalConfig::new(page_size, retry)?,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            submit: parse_flag(&lookup, ENV_SUBMIT)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { name, value: raw })
}

fn parse_flag<F>(lookup: &F, name: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value: raw }),
    }
}
