// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
///
/// The quiz business-rule rejections (`AlreadyPassed`, `NoAttemptsRemaining`)
/// are their own variants rather than generic 403s so clients can branch on
/// the `kind` field instead of string-matching messages.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    InvalidRequest(String),

    // 403 Forbidden: a passing attempt already exists for this (user, quiz)
    AlreadyPassed,

    // 403 Forbidden: the attempt cap has been reached
    NoAttemptsRemaining,

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., a quiz already exists for the material)
    Conflict(String),

    // 500 Internal Server Error: persistence fault, detail is logged only
    Persistence(String),
}

impl AppError {
    /// Stable machine-readable error kind included in every error response.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::AlreadyPassed => "already_passed",
            AppError::NoAttemptsRemaining => "no_attempts_remaining",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Persistence(_) => "persistence_failure",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// Raw persistence errors are logged and replaced with a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AlreadyPassed => (
                StatusCode::FORBIDDEN,
                "You have already passed this quiz.".to_string(),
            ),
            AppError::NoAttemptsRemaining => (
                StatusCode::FORBIDDEN,
                "You have no more attempts for this quiz.".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Persistence(msg) => {
                tracing::error!("Persistence failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::Persistence`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}
