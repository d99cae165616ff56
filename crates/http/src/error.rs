//! Error handling for the stacks HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Wire format shared by every HTTP error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

/// Application error types that map to HTTP responses.
///
/// `message` is the human-facing summary, `detail` the underlying error
/// text (decode failure, store failure, ...). Both end up in the JSON body
/// as `{"message", "error"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {message}")]
    BadRequest { message: String, detail: String },

    #[error("not found: {message}")]
    NotFound { message: String, detail: String },

    #[error("internal error: {message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    /// Client-side failure: malformed payload, bad id format, rejected write.
    pub fn bad_request(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// The referenced record has no live row in the store.
    pub fn not_found(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::NotFound {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Backing-store fault surfaced on a read path.
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let status = self.status();

        let (message, detail) = match self {
            ApiError::BadRequest { message, detail }
            | ApiError::NotFound { message, detail }
            | ApiError::Internal { message, detail } => (message, detail),
        };

        tracing::error!(
            error_id = %error_id,
            status_code = status.as_u16(),
            error = %detail,
            "request error"
        );

        // Internal faults keep their summary but hide backend details in
        // release builds.
        let detail = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "internal server error".to_string()
        } else {
            detail
        };

        (status, Json(ErrorBody { message, error: detail })).into_response()
    }
}
