//! Test storage: a storage implementation that always fails.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizbot_core::error::DomainError;
use quizbot_core::models::{
    Challenge, NewChallenge, Participant, PhaseResult, Pretender, User, UserProfile,
};
use quizbot_core::storage::{ChallengeStorage, ParticipantStorage, ResultStorage, UserStorage};

fn refused<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

/// A storage that returns an infrastructure error from every call. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingStorage;

#[async_trait]
impl ChallengeStorage for FailingStorage {
    async fn create_challenge(&self, _challenge: NewChallenge) -> Result<Challenge, DomainError> {
        refused()
    }

    async fn get_actual_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        refused()
    }

    async fn get_challenge(&self, _challenge_id: i64) -> Result<Option<Challenge>, DomainError> {
        refused()
    }

    async fn get_last_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        refused()
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, DomainError> {
        refused()
    }

    async fn finish_challenge(
        &self,
        _challenge_id: i64,
        _finished_at: DateTime<Utc>,
    ) -> Result<Option<Challenge>, DomainError> {
        refused()
    }

    async fn get_finished_challenge_ids(&self) -> Result<Vec<i64>, DomainError> {
        refused()
    }
}

#[async_trait]
impl ParticipantStorage for FailingStorage {
    async fn create_participant(
        &self,
        _user_id: i64,
        _challenge_id: i64,
    ) -> Result<Participant, DomainError> {
        refused()
    }

    async fn get_participation(
        &self,
        _user_id: i64,
        _challenge_id: i64,
    ) -> Result<Option<Participant>, DomainError> {
        refused()
    }

    async fn increment_score(&self, _participant_id: i64) -> Result<(), DomainError> {
        refused()
    }

    async fn finish_participation(
        &self,
        _participant_id: i64,
        _finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        refused()
    }

    async fn get_pretenders(&self, _challenge_id: i64) -> Result<Vec<Pretender>, DomainError> {
        refused()
    }

    async fn has_all_winners(
        &self,
        _challenge_id: i64,
        _winner_amount: u32,
    ) -> Result<bool, DomainError> {
        refused()
    }
}

#[async_trait]
impl ResultStorage for FailingStorage {
    async fn create_result(
        &self,
        _participant_id: i64,
        _phase: u32,
    ) -> Result<PhaseResult, DomainError> {
        refused()
    }

    async fn finish_phase(
        &self,
        _result_id: i64,
        _finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        refused()
    }

    async fn get_last_result(
        &self,
        _participant_id: i64,
    ) -> Result<Option<PhaseResult>, DomainError> {
        refused()
    }
}

#[async_trait]
impl UserStorage for FailingStorage {
    async fn get_or_create_user(&self, _profile: &UserProfile) -> Result<User, DomainError> {
        refused()
    }

    async fn get_user(&self, _external_id: i64) -> Result<Option<User>, DomainError> {
        refused()
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        refused()
    }
}
