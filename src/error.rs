//! Structured error types shared by the store, the actions and the HTTP layer.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    InvalidCredentials,
    Forbidden,
    ValidationError,
    Conflict,
    StoreError,
}

/// Application error. Every failure an operation can report is one of these.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    /// No session, or the session is unknown or expired.
    #[error("authentication required")]
    Unauthorized,

    /// Login failed. Identical for unknown users and wrong passwords.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(anyhow::Error),
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Store(_) => ErrorCode::StoreError,
        }
    }

    // Convenience constructors

    pub fn not_found(what: impl fmt::Display) -> Self {
        AppError::NotFound(what.to_string())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::invalid(field, format!("{} is required", field))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, AppError::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, field) = match self {
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            // Store details stay in the log.
            AppError::Store(_) => ("internal error".to_string(), None),
            other => (other.to_string(), None),
        };
        ErrorBody {
            code: self.code(),
            message,
            field,
        }
    }
}

// Store code returns anyhow; domain errors raised there travel inside it.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app_err) => app_err,
            Err(err) => AppError::Store(err),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(err.into())
    }
}

// Malformed request data is a validation failure like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid("query", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unauthorized => return Redirect::to("/login").into_response(),
            AppError::Store(e) => error!(error = ?e, "Request failed with store error"),
            _ => {}
        }
        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
