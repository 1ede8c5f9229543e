//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quizbot_challenge::application::chitchat::SilentChitchat;
use quizbot_challenge::domain::settings::QuizSettings;
use quizbot_core::clock::Clock;
use quizbot_core::storage::Storage;
use quizbot_store::memory::InMemoryStorage;
use quizbot_store::pg_storage::PgStorage;
use quizbot_test_support::{FixedClock, MockRng};
use sqlx::PgPool;
use tower::ServiceExt;

use quizbot_api::routes;
use quizbot_api::state::AppState;

/// Two regular challenges: `arithmetic` (two questions, one winner) and
/// `colors` (one question, two winners).
pub const QUIZ_YAML: &str = r"
challenges:
  - name: arithmetic
    type: regular
    duration_secs: 3600
    questions: ['2+2?', 'Sky color?']
    answers: ['4', 'blue']
  - name: colors
    type: regular
    max_winners: 2
    questions: ['Color of grass?']
    answers: [['green', 'grassy']]
";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Application state over `storage` with a deterministic clock and RNG.
pub fn build_state(storage: Arc<dyn Storage>, autostart: bool) -> AppState {
    let mut settings = QuizSettings::from_yaml(QUIZ_YAML).unwrap();
    settings.autostart = autostart;
    AppState::new(
        Arc::new(settings),
        storage,
        fixed_clock(),
        Box::new(MockRng),
        Arc::new(SilentChitchat),
    )
}

/// In-memory application state.
pub fn memory_state(autostart: bool) -> AppState {
    build_state(Arc::new(InMemoryStorage::new()), autostart)
}

/// Application state over a migrated Postgres pool.
pub fn pg_state(pool: PgPool, autostart: bool) -> AppState {
    build_state(Arc::new(PgStorage::new(pool)), autostart)
}

/// The full app router. Uses the same route tree as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// An update body for the user `external_id` chatting in `external_id * 10`.
pub fn update(external_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "user": {
            "external_id": external_id,
            "chat_id": external_id * 10,
            "nick_name": format!("player{external_id}"),
            "first_name": format!("Player {external_id}"),
        },
        "text": text,
    })
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
