//! Errors surfaced by request handlers.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use todo_core::{ApiError, DeletionError};

use crate::{session, views};

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not reach the todo API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid form submission: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Deletion(#[from] DeletionError),
}

impl WebError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WebError::Api(err) if err.is_auth_error())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::Api(ApiError::Unauthorized(_)) => return session::signed_out_redirect(),
            WebError::Api(ApiError::NotFound) => {
                return (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response()
            }
            WebError::Multipart(err) => (err.status(), err.body_text()),
            WebError::Deletion(err) => (StatusCode::CONFLICT, err.to_string()),
            WebError::Api(_) | WebError::Transport(_) => {
                tracing::error!(error = %self, "todo API request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "The todo service is unavailable. Please try again.".to_string(),
                )
            }
        };
        (status, Html(views::error_page(&message))).into_response()
    }
}
