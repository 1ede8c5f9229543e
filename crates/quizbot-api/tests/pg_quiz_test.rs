//! Quiz flows against PostgreSQL.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_pg_winner_chains_into_next_challenge(pool: PgPool) {
    // Arrange
    let state = common::pg_state(pool, true);
    state.manager.bootstrap().await.unwrap();
    let app = || common::build_test_app(state.clone());

    // Act
    common::post_json(app(), "/api/v1/updates", &common::update(1, "/start")).await;
    common::post_json(app(), "/api/v1/updates", &common::update(1, "4")).await;
    let (status, finished) =
        common::post_json(app(), "/api/v1/updates", &common::update(1, "blue")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["replies"].as_array().unwrap().len(), 4);
    let (_, current) = common::get_json(app(), "/api/v1/challenges/current").await;
    assert_eq!(current["name"], "colors");
    assert!(current["finished_at"].is_null());
    let (_, info) = common::get_json(app(), "/api/v1/challenges/1").await;
    assert!(info["info"].as_str().unwrap().contains("@player1 with 2 points"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_pg_second_start_is_rejected(pool: PgPool) {
    let state = common::pg_state(pool, false);
    let app = || common::build_test_app(state.clone());

    let (first, _) = common::post_empty(app(), "/api/v1/challenges/next").await;
    let (second, json) = common::post_empty(app(), "/api/v1/challenges/next").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(json["error"], "challenge_already_active");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_pg_repeated_start_enrolls_once(pool: PgPool) {
    let state = common::pg_state(pool.clone(), false);
    state.manager.start_next_challenge().await.unwrap();
    let app = || common::build_test_app(state.clone());

    common::post_json(app(), "/api/v1/updates", &common::update(1, "/start")).await;
    let (_, again) = common::post_json(app(), "/api/v1/updates", &common::update(1, "/start")).await;

    assert_eq!(again["replies"].as_array().unwrap().len(), 1);
    let participants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(participants, 1);
}
