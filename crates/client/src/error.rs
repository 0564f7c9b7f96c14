//! Error types for the client state layer.
//!
//! Two concerns, two enums: [`ApiError`] for everything that crosses the
//! network boundary, [`StorageError`] for the durable key-value layer. Store
//! operations catch `ApiError` at the store boundary; fetches record the
//! message in store state, plugin toggles re-raise to the caller.

use serde::Deserialize;
use thiserror::Error;

/// Errors produced by the HTTP adapter.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the session (HTTP 401). Local credentials have
    /// already been wiped and the client redirected to the login entry point.
    #[error("session expired, please sign in again")]
    Unauthenticated,

    /// Any other non-2xx response. `message` carries the server-provided
    /// detail when present, otherwise a synthesized `<status> <endpoint>
    /// failed` line.
    #[error("{message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Relative endpoint path the request was made against.
        endpoint: String,
        /// Server detail or synthesized fallback.
        message: String,
    },

    /// Network-level failure (connect, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON the caller expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error body shape the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    error: Option<String>,
}

/// Extract the server-provided error detail from a response body, if any.
///
/// The backend reports failures as `{ "detail": ... }` or `{ "error": ... }`;
/// anything else (absent body, HTML error page, malformed JSON) yields `None`
/// and the caller falls back to a synthesized message.
#[must_use]
pub(crate) fn error_body_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.detail.or(parsed.error)
}

/// Errors produced by the durable key-value storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}
