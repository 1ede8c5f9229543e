//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizbot_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Startup errors of the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Environment or quiz file is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection, pool or migration error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Persisted history does not fit the configured quiz.
    #[error("quiz bootstrap failed: {0}")]
    Bootstrap(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::ChallengeNotFound(_) => (StatusCode::NOT_FOUND, "challenge_not_found"),
            DomainError::NoActiveChallenge => (StatusCode::NOT_FOUND, "no_active_challenge"),
            DomainError::ChallengeAlreadyActive(_) => {
                (StatusCode::CONFLICT, "challenge_already_active")
            }
            DomainError::QuizFinished => (StatusCode::CONFLICT, "quiz_finished"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::ChallengeCountExceeded { .. } | DomainError::ConfigurationDrift(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            DomainError::MissingNextPhase { .. }
            | DomainError::PhaseResultNotFound(_)
            | DomainError::PhaseOutOfRange { .. }
            | DomainError::WinnerNotFound { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inconsistent_state")
            }
            DomainError::Delivery(_) => (StatusCode::INTERNAL_SERVER_ERROR, "delivery_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
