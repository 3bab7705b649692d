use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum ApiError {
    /// Database-related errors.
    Database(sqlx::Error),
    /// Requested identity does not exist.
    NotFound(String),
    /// A uniqueness constraint would be violated by a write.
    Conflict(String),
    /// A domain rule violation that is neither not-found nor conflict.
    Business(String),
    /// Field-level validation failures, one message per violated field.
    Validation(Vec<String>),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Business(msg) => write!(f, "Business rule violation: {}", msg),
            ApiError::Validation(msgs) => write!(f, "Validation failed: {}", msgs.join("; ")),
        }
    }
}

/// Uniform JSON error envelope returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub details: Vec<String>,
}

const BAD_REQUEST_TITLE: &str = "Bad Request! Consult the documentation";
const CONFLICT_TITLE: &str = "Conflict! Consult the documentation";
const INTERNAL_TITLE: &str = "Internal Server Error";

impl ApiError {
    /// Short label identifying the error kind in the envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "Database",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Business(_) => "Business",
            ApiError::Validation(_) => "Validation",
        }
    }

    /// HTTP status this error maps to. NotFound deliberately maps to 400,
    /// following the upstream back-office convention.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) | ApiError::Business(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Database(_) => INTERNAL_TITLE,
            ApiError::Conflict(_) => CONFLICT_TITLE,
            _ => BAD_REQUEST_TITLE,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            ApiError::Database(_) => vec!["Database error".to_string()],
            ApiError::NotFound(msg) | ApiError::Conflict(msg) | ApiError::Business(msg) => {
                vec![msg.clone()]
            }
            ApiError::Validation(msgs) => msgs.clone(),
        }
    }

    /// Builds the error envelope carried by the HTTP response body.
    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            title: self.title().to_string(),
            timestamp: Utc::now(),
            status: self.status_code().as_u16(),
            error: self.kind().to_string(),
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    /// Converts the error into an HTTP response.
    ///
    /// This is the single translation point from domain failures to
    /// transport-level status codes and the JSON error envelope.
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
            }
            ApiError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
            }
            _ => {}
        }

        let body = self.to_response_body();
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Converts a `sqlx::Error` into an `ApiError`.
    ///
    /// Unique-constraint violations (duplicate CPF, duplicate credit code)
    /// are surfaced as `Conflict` with the driver's message passed through;
    /// everything else stays a database error.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict(db_err.message().to_string());
            }
        }
        ApiError::Database(err)
    }
}
