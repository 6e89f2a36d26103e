//! HTTP client for the job board list endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::QueryState,
    section::ListSection,
    types::{ListResponse, RawListResponse},
    Error,
};

/// Request timeout used by [`Client::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the job board REST API.
///
/// One `reqwest::Client` is built up front and shared by every request.
/// Authentication is an opaque bearer token supplied by the caller.
pub struct Client {
    /// Base URL for the API, without a trailing slash.
    base_api_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client for `base_url` with the default 30-second timeout.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http,
        })
    }

    /// Attaches a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, section: &ListSection, query: &QueryState) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, section.path).as_str()).map_err(
            |e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::RequestFailed
            },
        )?;
        Ok(query.add_to_url(&url, section))
    }

    /// Fetches one listing for `section` and normalizes the body.
    ///
    /// Exactly one request is sent; there is no retry. A body that is
    /// neither an envelope nor a bare array is [`Error::MalformedResponse`].
    pub async fn get_list<T>(
        &self,
        section: &ListSection,
        query: &QueryState,
    ) -> Result<ListResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        let url = self.get_url(section, query)?;
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(url)
            .header("accept", "application/json, text/plain, */*");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!("Request to {} timed out", section.path);
            } else {
                tracing::error!("Failed to get resource: {}", e);
            }
            Error::RequestFailed
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<RawListResponse<T>>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse list response: {} | body: {}", e, snippet);
            Error::MalformedResponse(e.to_string())
        })?;

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_body;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "ش".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() < body.len());
    }
}
