//! Inbound chat messages.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use quizbot_challenge::application::bot::InboundMessage;
use quizbot_core::models::UserProfile;
use quizbot_core::response::BotResponse;
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Sender of an inbound message.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub external_id: i64,
    pub chat_id: i64,
    pub nick_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request body for POST /api/v1/updates.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub user: UserPayload,
    pub text: String,
}

impl From<UpdateRequest> for InboundMessage {
    fn from(request: UpdateRequest) -> Self {
        Self {
            profile: UserProfile {
                external_id: request.user.external_id,
                chat_id: request.user.chat_id,
                nick_name: request.user.nick_name,
                first_name: request.user.first_name,
                last_name: request.user.last_name,
            },
            text: request.text,
        }
    }
}

/// POST /api/v1/updates
#[instrument(skip(state, request), fields(chat_id = request.user.chat_id))]
async fn handle_update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<BotResponse>, ApiError> {
    let lock = state.chat_locks.lock_for(request.user.chat_id);
    let _guard = lock.lock().await;
    let response = state.bot.handle(request.into()).await?;
    Ok(Json(response))
}

/// Returns the router for inbound updates.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(handle_update))
}
