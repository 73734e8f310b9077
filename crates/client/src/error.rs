//! Client error type.

use thiserror::Error;

use bookstore_core::{ErrorBody, ErrorCode, ValidationErrors};

/// Errors raised by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation needs a logged-in session.
    #[error("please log in first")]
    Unauthenticated,

    /// Local pre-check failed; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// The server rejected the request.
    #[error("server returned {status}: {}", body.message)]
    Api {
        /// HTTP status code.
        status: u16,
        /// Decoded error body.
        body: ErrorBody,
    },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be joined with a path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local storage could not be read or written.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The server's error code, if this came from the API.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { body, .. } => Some(body.code),
            _ => None,
        }
    }
}
