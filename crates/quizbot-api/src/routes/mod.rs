//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod challenges;
pub mod chats;
pub mod health;
pub mod quiz;
pub mod updates;

/// The full route tree, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/updates", updates::router())
        .nest("/api/v1/quiz", quiz::router())
        .nest("/api/v1/challenges", challenges::router())
        .nest("/api/v1/chats", chats::router())
}
