//! The error taxonomy shared by both planes.
//!
//! HTTP handlers turn an [`ApiError`] into a `{"error": "..."}` body with the
//! matching status code; everything else (the migration engine, retry, the
//! job runner) deals in `anyhow::Error` and classifies failures with
//! [`TransportError`] where it matters for retry decisions.

use thiserror::Error;

/// Validation, not-found, and invariant-violation failures surfaced to HTTP
/// clients. Constructed close to the point of detection so the status code
/// and message travel together.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> http::StatusCode {
        match self {
            ApiError::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => http::StatusCode::NOT_FOUND,
            ApiError::Internal(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m,
        }
    }
}

/// Classification of an outbound HTTP call's outcome, used by
/// [`crate::retry::retry_async`] to decide whether another attempt is
/// worthwhile. Carries the HTTP status when one was received at all, since a
/// protocol error (an unexpected 4xx) and a transport error (a dropped
/// connection) are distinguished only by whether a status came back.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("request build error: {0}")]
    Build(#[from] http::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        status: http::StatusCode,
        url: String,
        body: String,
    },
}

impl TransportError {
    /// Transient failures that `retry_async` should retry: connection-level
    /// errors, 5xx, and the two 4xx codes that mean "try again later".
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Transport(_) => true,
            TransportError::Build(_) => false,
            TransportError::Timeout { .. } => true,
            TransportError::Status { status, .. } => {
                status.is_server_error()
                    || *status == http::StatusCode::REQUEST_TIMEOUT
                    || *status == http::StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}
