// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Credential is expired and has no refresh token; the user must
    /// re-authorize from scratch.
    #[error("Credential expired and unrefreshable, re-authorization required")]
    ReAuthRequired,

    /// Stored credential blob could not be parsed. Distinct from
    /// `ReAuthRequired` so the two show up separately in logs.
    #[error("Stored credential is corrupt or unreadable")]
    CorruptCredential,

    /// OAuth code exchange (or state verification) failed during the
    /// delegation callback.
    #[error("Authorization exchange failed: {0}")]
    ExchangeFailed(String),

    /// User-supplied due date is not a valid DD-MM-YYYY calendar date.
    #[error("Invalid due date: {0}")]
    InvalidDate(String),

    /// User input did not match the expected command format.
    #[error("Invalid input: {0}")]
    InvalidFormat(String),

    /// Google OAuth endpoint error (refresh or exchange round-trip).
    #[error("Google auth error: {0}")]
    AuthApi(String),

    /// Google Tasks API error.
    #[error("Google Tasks error: {0}")]
    TasksApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::ReAuthRequired => (StatusCode::UNAUTHORIZED, "reauth_required", None),
            AppError::CorruptCredential => {
                tracing::error!("Stored credential unreadable");
                (StatusCode::UNAUTHORIZED, "corrupt_credential", None)
            }
            AppError::ExchangeFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "exchange_failed", Some(msg.clone()))
            }
            AppError::InvalidDate(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_date", Some(msg.clone()))
            }
            AppError::InvalidFormat(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_format", Some(msg.clone()))
            }
            AppError::AuthApi(msg) => (StatusCode::BAD_GATEWAY, "auth_error", Some(msg.clone())),
            AppError::TasksApi(msg) => (StatusCode::BAD_GATEWAY, "tasks_error", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
