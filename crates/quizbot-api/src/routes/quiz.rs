//! Quiz-wide state.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use quizbot_challenge::domain::state::QuizState;
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /api/v1/quiz/state.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: QuizState,
}

/// GET /api/v1/quiz/state
#[instrument(skip(state))]
async fn quiz_state(State(state): State<AppState>) -> Result<Json<StateResponse>, ApiError> {
    let quiz_state = state.manager.current_state().await?;
    Ok(Json(StateResponse { state: quiz_state }))
}

/// Returns the router for quiz state queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/state", get(quiz_state))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::testing::{call, test_app_state};

    #[tokio::test]
    async fn test_state_follows_lifecycle() {
        // Arrange
        let state = test_app_state();

        // Act
        let (status, before) = call(router().with_state(state.clone()), "GET", "/state", None).await;
        state.manager.start_next_challenge().await.unwrap();
        let (_, after) = call(router().with_state(state), "GET", "/state", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(before["state"], "new");
        assert_eq!(after["state"], "in_progress");
    }
}
