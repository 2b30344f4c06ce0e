//! Application error type and its mapping to JSON error responses.
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

/// The errors a handler may answer with.
///
/// Every variant renders a fixed message; internal detail is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, malformed, tampered or expired token.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Authenticated, but acting on another user's data.
    #[error("forbidden")]
    Forbidden,

    /// The request body or query did not have the expected shape. The message
    /// is one of the crate's fixed strings, never decoder output.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user not found")]
    UserNotFound,

    /// Email exists but the password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    DuplicateUser,

    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction referenced a category or user that does not exist.
    #[error("invalid category or user reference")]
    InvalidReference,

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::InvalidReference => AppError::InvalidReference,
            err => AppError::Store(err),
        }
    }
}

/// Shown for any body or query the extractors could not decode.
pub const INVALID_REQUEST: &str = "Invalid request";

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(detail = %rejection.body_text(), "json body rejected");
        AppError::Validation(INVALID_REQUEST.into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!(detail = %rejection.body_text(), "query rejected");
        AppError::Validation(INVALID_REQUEST.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::DuplicateUser | AppError::InvalidReference => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserNotFound | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Unauthenticated => "Unauthorized".into(),
            AppError::Forbidden => "Forbidden".into(),
            AppError::Validation(msg) => msg.clone(),
            AppError::UserNotFound => "User not found".into(),
            AppError::InvalidCredentials => "Invalid email or password".into(),
            AppError::DuplicateUser => "Could not register user".into(),
            AppError::NotFound => "Resource not found".into(),
            AppError::InvalidReference => "Unknown category or user".into(),
            AppError::Store(_) | AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
