//! End-to-end quiz flows over the HTTP API with in-memory storage.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::build_test_app(common::memory_state(false));

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app(common::memory_state(false));

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_winner_chains_into_next_challenge() {
    // Arrange
    let state = common::memory_state(true);
    state.manager.bootstrap().await.unwrap();
    let app = || common::build_test_app(state.clone());

    // Act
    let (_, started) = common::post_json(app(), "/api/v1/updates", &common::update(1, "/start")).await;
    common::post_json(app(), "/api/v1/updates", &common::update(2, "/start")).await;
    common::post_json(app(), "/api/v1/updates", &common::update(1, "4")).await;
    let (status, finished) =
        common::post_json(app(), "/api/v1/updates", &common::update(1, "blue")).await;
    let (_, late) = common::post_json(app(), "/api/v1/updates", &common::update(2, "blue")).await;

    // Assert
    assert_eq!(started["replies"][1], "Question #1: 2+2?");
    assert_eq!(status, StatusCode::OK);
    let replies = finished["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 4);
    assert!(replies[1].as_str().unwrap().contains("place #1 with 2 points"));
    assert_eq!(replies[3], "Question #1: Color of grass?");
    assert_eq!(late["markup"], "start");

    let (_, quiz) = common::get_json(app(), "/api/v1/quiz/state").await;
    assert_eq!(quiz["state"], "in_progress");
    let (_, current) = common::get_json(app(), "/api/v1/challenges/current").await;
    assert_eq!(current["name"], "colors");
    assert_eq!(current["number"], 2);
    let (_, info) = common::get_json(app(), "/api/v1/challenges/1").await;
    assert!(info["info"].as_str().unwrap().contains("@player1 with 2 points"));
}

#[tokio::test]
async fn test_manual_start_broadcasts_join_prompt() {
    // Arrange
    let state = common::memory_state(false);
    let app = || common::build_test_app(state.clone());
    common::post_json(app(), "/api/v1/updates", &common::update(1, "/help")).await;
    let (_, not_started) =
        common::post_json(app(), "/api/v1/updates", &common::update(1, "/start")).await;

    // Act
    let (status, json) = common::post_empty(app(), "/api/v1/challenges/next").await;
    let (_, outbox) = common::get_json(app(), "/api/v1/chats/10/outbox").await;

    // Assert
    assert_eq!(not_started["replies"].as_array().unwrap().len(), 1);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["notified"]["delivered"], 1);
    let messages = outbox["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0]["text"].as_str().unwrap().starts_with("Challenge #1: arithmetic"));
    assert_eq!(messages[1]["markup"], "start");
}

#[tokio::test]
async fn test_quiz_finishes_after_last_challenge() {
    // Arrange
    let state = common::memory_state(true);
    state.manager.bootstrap().await.unwrap();
    let app = || common::build_test_app(state.clone());
    for text in ["/start", "4", "blue"] {
        common::post_json(app(), "/api/v1/updates", &common::update(1, text)).await;
    }
    common::post_json(app(), "/api/v1/updates", &common::update(2, "/start")).await;

    // Act
    common::post_json(app(), "/api/v1/updates", &common::update(1, "green")).await;
    let (_, last) = common::post_json(app(), "/api/v1/updates", &common::update(2, "grassy")).await;
    let (_, quiz) = common::get_json(app(), "/api/v1/quiz/state").await;
    let (status, json) = common::post_empty(app(), "/api/v1/challenges/next").await;

    // Assert
    assert_eq!(quiz["state"], "finished");
    let replies = last["replies"].as_array().unwrap();
    assert!(replies[1].as_str().unwrap().contains("place #2"));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "quiz_finished");
}
