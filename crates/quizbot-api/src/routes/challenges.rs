//! Challenge queries and lifecycle commands.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use quizbot_challenge::application::notifier::NotifyReport;
use quizbot_challenge::domain::challenge_info::ChallengeType;
use quizbot_challenge::domain::state::QuizState;
use quizbot_core::error::DomainError;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// The challenge held by the keeper.
#[derive(Debug, Serialize)]
pub struct CurrentChallengeResponse {
    pub challenge_id: i64,
    /// Position in the configured quiz, starting at 1.
    pub number: usize,
    pub name: String,
    pub challenge_type: ChallengeType,
    pub phase_amount: u32,
    pub winner_amount: u32,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Rendered status of one challenge.
#[derive(Debug, Serialize)]
pub struct ChallengeInfoResponse {
    pub challenge_id: i64,
    pub info: String,
}

/// Response body for POST /next.
#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub state: QuizState,
    pub challenge_id: i64,
    pub notified: NotifyReport,
}

/// GET /current
#[instrument(skip(state))]
async fn current(
    State(state): State<AppState>,
) -> Result<Json<CurrentChallengeResponse>, ApiError> {
    let active = state
        .manager
        .current_challenge()
        .await?
        .ok_or(DomainError::NoActiveChallenge)?;
    Ok(Json(CurrentChallengeResponse {
        challenge_id: active.challenge.id,
        number: active.number,
        challenge_type: active.info.challenge_type(),
        name: active.challenge.name,
        phase_amount: active.challenge.phase_amount,
        winner_amount: active.challenge.winner_amount,
        created_at: active.challenge.created_at,
        finished_at: active.challenge.finished_at,
    }))
}

/// GET /{id}
#[instrument(skip(state))]
async fn challenge_info(
    State(state): State<AppState>,
    Path(challenge_id): Path<i64>,
) -> Result<Json<ChallengeInfoResponse>, ApiError> {
    let info = state.manager.get_challenge_info(Some(challenge_id)).await?;
    Ok(Json(ChallengeInfoResponse { challenge_id, info }))
}

/// POST /next
#[instrument(skip(state))]
async fn start_next(State(state): State<AppState>) -> Result<Json<StartedResponse>, ApiError> {
    let quiz_state = state.manager.start_next_challenge().await?;
    let active = state
        .manager
        .current_challenge()
        .await?
        .ok_or(DomainError::NoActiveChallenge)?;
    let notified = state.notifier.notify(active.challenge.id, true).await?;
    info!(challenge_id = active.challenge.id, "next challenge started");
    Ok(Json(StartedResponse {
        state: quiz_state,
        challenge_id: active.challenge.id,
        notified,
    }))
}

/// POST /{id}/notify
#[instrument(skip(state))]
async fn notify(
    State(state): State<AppState>,
    Path(challenge_id): Path<i64>,
) -> Result<Json<NotifyReport>, ApiError> {
    let report = state.notifier.notify(challenge_id, false).await?;
    Ok(Json(report))
}

/// Returns the router for challenges.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(current))
        .route("/next", post(start_next))
        .route("/{id}", get(challenge_info))
        .route("/{id}/notify", post(notify))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use quizbot_core::models::UserProfile;
    use quizbot_core::storage::UserStorage;
    use quizbot_store::memory::InMemoryStorage;
    use std::sync::Arc;

    use super::*;
    use crate::testing::{app_state_with, call, test_app_state};

    #[tokio::test]
    async fn test_current_without_challenge_returns_404() {
        let app = router().with_state(test_app_state());

        let (status, json) = call(app, "GET", "/current", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "no_active_challenge");
    }

    #[tokio::test]
    async fn test_next_starts_and_broadcasts() {
        // Arrange
        let storage = Arc::new(InMemoryStorage::new());
        for external_id in [1, 2] {
            storage
                .get_or_create_user(&UserProfile {
                    external_id,
                    chat_id: external_id * 10,
                    ..UserProfile::default()
                })
                .await
                .unwrap();
        }
        let state = app_state_with(storage);

        // Act
        let (status, json) = call(router().with_state(state.clone()), "POST", "/next", None).await;
        let (_, current) = call(router().with_state(state.clone()), "GET", "/current", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "in_progress");
        assert_eq!(json["challenge_id"], 1);
        assert_eq!(json["notified"]["delivered"], 2);
        assert_eq!(current["name"], "arithmetic");
        assert_eq!(current["number"], 1);
        assert_eq!(current["challenge_type"], "regular");
        assert_eq!(state.outbox.pending(10), 2);
    }

    #[tokio::test]
    async fn test_next_while_running_returns_409() {
        let state = test_app_state();
        state.manager.start_next_challenge().await.unwrap();

        let (status, json) = call(router().with_state(state), "POST", "/next", None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "challenge_already_active");
    }

    #[tokio::test]
    async fn test_info_for_known_and_unknown_challenge() {
        let state = test_app_state();
        state.manager.start_next_challenge().await.unwrap();

        let (status, json) = call(router().with_state(state.clone()), "GET", "/1", None).await;
        let (missing, _) = call(router().with_state(state), "GET", "/7", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["challenge_id"], 1);
        assert!(json["info"].as_str().unwrap().starts_with("Challenge #1: arithmetic"));
        assert_eq!(missing, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notify_reports_delivery() {
        let state = test_app_state();
        state.manager.start_next_challenge().await.unwrap();

        let (status, json) = call(router().with_state(state), "POST", "/1/notify", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["delivered"], 0);
        assert_eq!(json["failed"], 0);
    }
}
