//! Environment-driven configuration for list sessions.

use std::time::Duration;

use jobboard_api::{Client, DEFAULT_PAGE_SIZE};

use crate::error::SyncError;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Settings shared by every list session of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the REST API; section paths are appended to it.
    pub api_url: String,
    /// Bearer token issued by the session layer, if any.
    pub api_token: Option<String>,
    pub page_size: u32,
    /// Per-request timeout. Expiry is reported as an ordinary network failure.
    pub request_timeout: Duration,
    /// Quiet period before typed search text is committed.
    pub search_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl SyncConfig {
    /// Reads `JOBBOARD_*` variables from the process environment.
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_url: get("JOBBOARD_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            api_token: get("JOBBOARD_API_TOKEN").filter(|v| !v.trim().is_empty()),
            page_size: parse_or(&get, "JOBBOARD_PAGE_SIZE", defaults.page_size).max(1),
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "JOBBOARD_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            search_debounce: Duration::from_millis(parse_or(
                &get,
                "JOBBOARD_SEARCH_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )),
        }
    }

    /// Builds an HTTP client honoring the URL, timeout and token settings.
    pub fn build_client(&self) -> Result<Client, SyncError> {
        let client = Client::with_timeout(&self.api_url, self.request_timeout)?;
        Ok(match &self.api_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    get(key)
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
