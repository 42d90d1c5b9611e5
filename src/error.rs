//! Error types for the API
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::repository::RepositoryError;

// == App Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Entity with the given id does not exist
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: u32 },

    /// Request body or query failed validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Request referenced a row that does not exist or is still in use
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ForeignKey { .. } => AppError::InvalidReference(err.to_string()),
            RepositoryError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    /// Flattens field errors into `"<field> <message>"` lines, sorted so
    /// responses are stable.
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|e| match &e.message {
                        Some(message) => format!("{} {}", field, message),
                        None => format!("{} is invalid", field),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => err.body_text(),
            JsonRejection::JsonSyntaxError(err) => err.body_text(),
            JsonRejection::MissingJsonContentType(_) => {
                "Content-Type must be application/json".to_string()
            }
            other => other.body_text(),
        };
        AppError::Validation(vec![message])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            AppError::InvalidReference(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers and services.
pub type Result<T> = std::result::Result<T, AppError>;
