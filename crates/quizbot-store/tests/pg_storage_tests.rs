//! Integration tests for `PgStorage`.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use quizbot_core::error::DomainError;
use quizbot_core::models::{NewChallenge, UserProfile};
use quizbot_core::storage::{ChallengeStorage, ParticipantStorage, ResultStorage, UserStorage};
use quizbot_store::pg_storage::PgStorage;
use sqlx::PgPool;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn new_challenge(name: &str, winner_amount: u32) -> NewChallenge {
    NewChallenge {
        name: name.to_owned(),
        phase_amount: 2,
        winner_amount,
        duration_secs: 3600,
        created_at: start(),
    }
}

fn profile(external_id: i64) -> UserProfile {
    UserProfile {
        external_id,
        chat_id: external_id * 100,
        nick_name: Some(format!("user{external_id}")),
        ..UserProfile::default()
    }
}

// --- challenges ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_only_one_challenge_can_be_active(pool: PgPool) {
    let storage = PgStorage::new(pool);

    let first = storage.create_challenge(new_challenge("a", 1)).await.unwrap();
    let second = storage.create_challenge(new_challenge("b", 1)).await;

    assert!(matches!(second, Err(DomainError::ChallengeAlreadyActive(id)) if id == first.id));
    let actual = storage.get_actual_challenge().await.unwrap().unwrap();
    assert_eq!(actual.id, first.id);
    assert_eq!(actual.phase_amount, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_finish_challenge_transitions_once(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let challenge = storage.create_challenge(new_challenge("a", 1)).await.unwrap();
    let at = start() + TimeDelta::minutes(5);

    let first = storage.finish_challenge(challenge.id, at).await.unwrap();
    let second = storage
        .finish_challenge(challenge.id, at + TimeDelta::minutes(1))
        .await
        .unwrap();

    assert_eq!(first.unwrap().finished_at, Some(at));
    assert!(second.is_none());
    assert!(storage.get_actual_challenge().await.unwrap().is_none());
    assert_eq!(storage.get_finished_challenge_ids().await.unwrap(), vec![challenge.id]);
    assert_eq!(storage.get_last_challenge().await.unwrap().unwrap().id, challenge.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_finish_unknown_challenge_is_not_found(pool: PgPool) {
    let storage = PgStorage::new(pool);

    let result = storage.finish_challenge(42, start()).await;

    assert!(matches!(result, Err(DomainError::ChallengeNotFound(42))));
}

// --- users ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_or_create_user_is_idempotent(pool: PgPool) {
    let storage = PgStorage::new(pool);

    let first = storage.get_or_create_user(&profile(1)).await.unwrap();
    let second = storage.get_or_create_user(&profile(1)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.chitchat_id, second.chitchat_id);
    assert_eq!(storage.list_users().await.unwrap().len(), 1);
    assert!(storage.get_user(2).await.unwrap().is_none());
}

// --- participants and results ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_participation_scoring_and_ranking(pool: PgPool) {
    // Arrange
    let storage = PgStorage::new(pool);
    let challenge = storage.create_challenge(new_challenge("a", 2)).await.unwrap();
    let slow = storage.get_or_create_user(&profile(1)).await.unwrap();
    let fast = storage.get_or_create_user(&profile(2)).await.unwrap();
    let slow_p = storage.create_participant(slow.id, challenge.id).await.unwrap();
    let fast_p = storage.create_participant(fast.id, challenge.id).await.unwrap();
    let again = storage.create_participant(slow.id, challenge.id).await.unwrap();

    // Act
    storage.increment_score(slow_p.id).await.unwrap();
    storage.increment_score(fast_p.id).await.unwrap();
    storage.finish_participation(fast_p.id, start()).await.unwrap();
    storage
        .finish_participation(slow_p.id, start() + TimeDelta::seconds(30))
        .await
        .unwrap();
    storage
        .finish_participation(fast_p.id, start() + TimeDelta::hours(1))
        .await
        .unwrap();
    let pretenders = storage.get_pretenders(challenge.id).await.unwrap();

    // Assert
    assert_eq!(again.id, slow_p.id);
    assert_eq!(pretenders.len(), 2);
    assert_eq!(pretenders[0].user.id, fast.id);
    assert_eq!(pretenders[0].participant.finished_at, Some(start()));
    assert_eq!(pretenders[1].participant.scores, 1);
    assert!(storage.has_all_winners(challenge.id, 2).await.unwrap());
    assert!(!storage.has_all_winners(challenge.id, 3).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_last_result_is_highest_phase(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let challenge = storage.create_challenge(new_challenge("a", 1)).await.unwrap();
    let user = storage.get_or_create_user(&profile(1)).await.unwrap();
    let participant = storage.create_participant(user.id, challenge.id).await.unwrap();

    let first = storage.create_result(participant.id, 1).await.unwrap();
    storage.finish_phase(first.id, start()).await.unwrap();
    storage.create_result(participant.id, 2).await.unwrap();

    let last = storage.get_last_result(participant.id).await.unwrap().unwrap();
    assert_eq!(last.phase, 2);
    assert!(last.finished_at.is_none());
}
