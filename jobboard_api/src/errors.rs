//! Error types for the API client.

/// Errors that can occur when calling a list endpoint.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The body was neither a `{results, count}` envelope nor a bare array.
    #[error("Malformed list response: {0}")]
    MalformedResponse(String),
}
