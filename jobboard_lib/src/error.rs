//! Error types for the sync engine.

use serde::Serialize;

/// Why a fetch cycle failed.
///
/// Both kinds look the same to the user; the distinction exists for logs
/// and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NetworkFailure,
    MalformedResponse,
}

impl FailureReason {
    /// Stable reason code for logs and telemetry.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::NetworkFailure => "network_failure",
            FailureReason::MalformedResponse => "malformed_response",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A failed call to the list endpoint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure, timeout, or a non-success HTTP status.
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    /// The body matched neither an envelope nor a bare collection.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn reason(&self) -> FailureReason {
        match self {
            FetchError::NetworkFailure(_) => FailureReason::NetworkFailure,
            FetchError::MalformedResponse(_) => FailureReason::MalformedResponse,
        }
    }
}

impl From<jobboard_api::Error> for FetchError {
    fn from(e: jobboard_api::Error) -> Self {
        match e {
            jobboard_api::Error::RequestFailed => {
                FetchError::NetworkFailure("request failed".to_string())
            }
            jobboard_api::Error::HttpStatus { status, body } => {
                FetchError::NetworkFailure(format!("HTTP {}: {}", status, body))
            }
            jobboard_api::Error::MalformedResponse(msg) => FetchError::MalformedResponse(msg),
        }
    }
}

/// Errors outside the fetch cycle: setup and input validation.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// User-provided input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The API client could not be constructed.
    #[error("API client error: {0}")]
    Api(#[from] jobboard_api::Error),
}
