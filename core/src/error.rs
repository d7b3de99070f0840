//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers act
//! on them: a missing todo renders a 404 page, a rejected credential ends
//! the session. Validation failures carry the server's message so it can be
//! shown next to the form. Everything else lands in `HttpError` with the
//! status code and the best message we could pull out of the body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401: the bearer credential was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server returned 422 with a validation message.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::HttpError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn only_unauthorized_is_auth_error() {
        assert!(ApiError::Unauthorized("Unauthenticated.".to_string()).is_auth_error());
        assert!(!ApiError::NotFound.is_auth_error());
    }
}
