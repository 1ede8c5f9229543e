//! Outbox collection for the chat gateway.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use quizbot_core::response::OutboundMessage;
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Messages drained from one chat's outbox.
#[derive(Debug, Serialize)]
pub struct OutboxResponse {
    pub chat_id: i64,
    pub messages: Vec<OutboundMessage>,
}

/// GET /{chat_id}/outbox
#[instrument(skip(state))]
async fn drain_outbox(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Json<OutboxResponse> {
    let messages = state.outbox.drain(chat_id);
    Json(OutboxResponse { chat_id, messages })
}

/// Returns the router for chat outboxes.
pub fn router() -> Router<AppState> {
    Router::new().route("/{chat_id}/outbox", get(drain_outbox))
}
