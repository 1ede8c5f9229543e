//! Participant enrollment, scoring and ranking.

use std::sync::Arc;

use quizbot_core::clock::Clock;
use quizbot_core::error::DomainError;
use quizbot_core::models::{Challenge, Participant, User};
use quizbot_core::storage::Storage;

use crate::domain::state::WinnerResult;

/// Tracks who plays which challenge and how they rank.
pub struct Registrar {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl Registrar {
    /// Creates a registrar over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// The user's enrollment in a challenge, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn get_participation_for_user(
        &self,
        user: &User,
        challenge_id: i64,
    ) -> Result<Option<Participant>, DomainError> {
        self.storage.get_participation(user.id, challenge_id).await
    }

    /// Enrolls the user; an existing enrollment is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn create_participation_for_user(
        &self,
        user: &User,
        challenge_id: i64,
    ) -> Result<Participant, DomainError> {
        let participant = self.storage.create_participant(user.id, challenge_id).await?;
        tracing::info!(
            user_id = user.id,
            user = %user.full_name(),
            challenge_id,
            "participant enrolled"
        );
        Ok(participant)
    }

    /// Adds one point.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn add_correct_answer(&self, participant: &Participant) -> Result<(), DomainError> {
        self.storage.increment_score(participant.id).await
    }

    /// Marks the participant finished now. A participant that already
    /// finished keeps its original time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn finish_participation(&self, participant: &Participant) -> Result<(), DomainError> {
        self.storage
            .finish_participation(participant.id, self.clock.now())
            .await
    }

    /// Whether the winner quota is filled.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn all_winners_exist(&self, challenge: &Challenge) -> Result<bool, DomainError> {
        self.storage
            .has_all_winners(challenge.id, challenge.winner_amount)
            .await
    }

    async fn ranked(&self, challenge: &Challenge) -> Result<Vec<WinnerResult>, DomainError> {
        let pretenders = self.storage.get_pretenders(challenge.id).await?;
        Ok(pretenders
            .into_iter()
            .filter_map(|pretender| {
                Some((pretender.participant.finished_at?, pretender))
            })
            .zip(1..)
            .map(|((finished_at, pretender), position)| WinnerResult {
                user: pretender.user,
                position,
                scores: pretender.participant.scores,
                finished_at,
            })
            .collect())
    }

    /// Finished participants ranked by score, then finish time, limited to
    /// the winner quota.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn get_winners(&self, challenge: &Challenge) -> Result<Vec<WinnerResult>, DomainError> {
        let mut winners = self.ranked(challenge).await?;
        winners.truncate(challenge.winner_amount as usize);
        Ok(winners)
    }

    /// The rank of a user that finished the challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::WinnerNotFound` if the user has not finished.
    pub async fn get_winner_result(
        &self,
        user: &User,
        challenge: &Challenge,
    ) -> Result<WinnerResult, DomainError> {
        self.ranked(challenge)
            .await?
            .into_iter()
            .find(|winner| winner.user.id == user.id)
            .ok_or(DomainError::WinnerNotFound {
                user_id: user.id,
                challenge_id: challenge.id,
            })
    }
}
