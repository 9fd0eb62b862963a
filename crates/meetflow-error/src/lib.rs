//! Shared error taxonomy for the meetflow service.
//!
//! Every crate in the workspace returns `AppError` (or converts into it) at
//! its public boundary so the HTTP layer has one place to translate failures
//! into status codes. Background tasks (stage executor, export generator,
//! retention sweep) catch `AppError` at their top level and never let it
//! propagate past the task boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Tagged error categories mirroring spec.md §7.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("{0}")]
    ExternalDependencyFailure(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ExternalDependencyFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal errors must never leak their detail to the client.
        let message = match &self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal error");
        }
        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound("artifact not found".to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
