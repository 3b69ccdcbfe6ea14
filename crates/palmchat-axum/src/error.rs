//! HTTP error types and mappings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use palmchat_core::ports::engine::InferenceError;
use palmchat_session::SessionError;

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Invalid request body or parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Recognized endpoint that is not built yet.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The inference collaborator failed; the caller may resubmit.
    #[error("Inference failed: {0}")]
    Upstream(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg.clone()),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Inference(inference) => inference.into(),
            SessionError::ToolLoopExhausted(_) => Self::Upstream(err.to_string()),
        }
    }
}

impl From<InferenceError> for HttpError {
    fn from(err: InferenceError) -> Self {
        Self::Upstream(err.to_string())
    }
}
