//! Helpers for route unit tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use quizbot_challenge::application::chitchat::SilentChitchat;
use quizbot_challenge::domain::settings::QuizSettings;
use quizbot_core::storage::Storage;
use quizbot_store::memory::InMemoryStorage;
use quizbot_test_support::{FailingStorage, FixedClock, MockRng};
use serde_json::Value;
use tower::ServiceExt;

use crate::state::AppState;

pub(crate) const QUIZ_YAML: &str = r"
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

pub(crate) fn app_state_with(storage: Arc<dyn Storage>) -> AppState {
    let settings = QuizSettings::from_yaml(QUIZ_YAML).unwrap();
    AppState::new(
        Arc::new(settings),
        storage,
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
        Box::new(MockRng),
        Arc::new(SilentChitchat),
    )
}

pub(crate) fn test_app_state() -> AppState {
    app_state_with(Arc::new(InMemoryStorage::new()))
}

pub(crate) fn failing_app_state() -> AppState {
    app_state_with(Arc::new(FailingStorage))
}

/// Sends a request with an optional JSON body and decodes the JSON reply.
pub(crate) async fn call(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}
