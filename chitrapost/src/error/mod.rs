//! HTTP-facing error taxonomy
//!
//! Every lower-level error is mapped into [`ApiError`] exactly once, and
//! every response body has the shape `{"error": "<message>"}`. Internal
//! details are logged, never returned.

use crate::auth::{AccountError, AuthFailure};
use crate::upload::UploadError;
use crate::validation::ValidationFailure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed validation (400)
    #[error("{0}")]
    Validation(ValidationFailure),

    /// Email already registered (400)
    #[error("email already exists")]
    DuplicateEmail,

    /// Any authentication failure (401)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Upload is not JPEG or PNG (400)
    #[error("file should be either jpeg or png")]
    UnsupportedContent,

    /// Malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Body over the route's limit (413)
    #[error("upload exceeds size limit")]
    PayloadTooLarge,

    /// Anything the client cannot act on (500); the detail is only logged
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::DuplicateEmail
            | Self::UnsupportedContent
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(%detail, "internal error");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        debug!(reason = %failure, "rejected bearer token");
        Self::InvalidCredentials
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(failure) => Self::Validation(failure),
            AccountError::DuplicateEmail => Self::DuplicateEmail,
            AccountError::InvalidCredentials => Self::InvalidCredentials,
            AccountError::Password(_) | AccountError::Token(_) | AccountError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::AccountNotFound => {
                debug!("token refers to a deleted account");
                Self::InvalidCredentials
            }
            UploadError::UnsupportedContent { .. } => Self::UnsupportedContent,
            UploadError::Provider(e) => Self::Internal(format!("upload provider: {e}")),
            UploadError::Store(e) => Self::Internal(format!("upload store: {e}")),
        }
    }
}
