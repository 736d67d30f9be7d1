use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    services::backup::ImportError,
    state::{model::InvalidAccent, scoreboard::ScoreboardError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A backup could not be imported; the current state is untouched.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    /// Unexpected internal failure (serialisation, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ScoreboardError> for ServiceError {
    fn from(err: ScoreboardError) -> Self {
        match err {
            ScoreboardError::ContestNotFound(_) | ScoreboardError::EntrantNotFound { .. } => {
                ServiceError::NotFound(err.to_string())
            }
            ScoreboardError::EmptyName(_) | ScoreboardError::InvalidOrder(_) => {
                ServiceError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<InvalidAccent> for ServiceError {
    fn from(err: InvalidAccent) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Import(source) => AppError::BadRequest(source.to_string()),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn scoreboard_errors_map_to_http_statuses() {
        let missing: AppError = ServiceError::from(ScoreboardError::ContestNotFound(Uuid::nil())).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let blank: AppError = ServiceError::from(ScoreboardError::EmptyName("entrant")).into();
        assert_eq!(blank.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn import_errors_are_bad_requests() {
        let err: AppError = ServiceError::from(ImportError::UnsupportedSchema { found: 0 }).into();
        assert!(err.to_string().contains("schema version 0"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
