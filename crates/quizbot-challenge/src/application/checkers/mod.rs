//! Answer checkers.
//!
//! A checker verifies an answer against the participant's current phase and,
//! when it is accepted, advances the participant to the next phase. The
//! advancement is shared; only the matching differs per `ChallengeType`.

mod regular;
mod story;

use std::sync::Arc;

use async_trait::async_trait;
use quizbot_core::clock::Clock;
use quizbot_core::error::DomainError;
use quizbot_core::models::{Challenge, Participant, PhaseResult, User};
use quizbot_core::storage::Storage;

use crate::domain::challenge_info::{ChallengeInfo, ChallengeType};
use crate::domain::state::CheckedResult;

pub use regular::{RegularChecker, normalize};
pub use story::StoryChecker;

/// Opens, finishes and advances phase results.
pub struct PhaseTracker {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl PhaseTracker {
    /// Creates a tracker over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Opens phase 1 for a new participant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn open_first(&self, participant: &Participant) -> Result<PhaseResult, DomainError> {
        self.storage.create_result(participant.id, 1).await
    }

    /// The participant's open phase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PhaseResultNotFound` if every phase result is
    /// finished or none exists.
    pub async fn current(&self, participant: &Participant) -> Result<PhaseResult, DomainError> {
        match self.storage.get_last_result(participant.id).await? {
            Some(result) if result.finished_at.is_none() => Ok(result),
            _ => Err(DomainError::PhaseResultNotFound(participant.id)),
        }
    }

    /// Finishes `current` and opens the following phase, unless `current` is
    /// the last one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn advance(
        &self,
        participant: &Participant,
        challenge: &Challenge,
        current: &PhaseResult,
    ) -> Result<CheckedResult, DomainError> {
        self.storage
            .finish_phase(current.id, self.clock.now())
            .await?;
        if current.phase >= challenge.phase_amount {
            tracing::debug!(
                participant_id = participant.id,
                challenge_id = challenge.id,
                phase = current.phase,
                "last phase finished"
            );
            return Ok(CheckedResult {
                correct: true,
                phase: current.phase,
                next_phase: None,
            });
        }
        let next_phase = current.phase + 1;
        self.storage
            .create_result(participant.id, next_phase)
            .await?;
        tracing::debug!(
            participant_id = participant.id,
            challenge_id = challenge.id,
            phase = next_phase,
            "next phase opened"
        );
        Ok(CheckedResult {
            correct: true,
            phase: current.phase,
            next_phase: Some(next_phase),
        })
    }
}

/// Checks answers for one kind of challenge.
#[async_trait]
pub trait AnswerChecker: Send + Sync {
    /// The kind of challenge this checker serves.
    fn challenge_type(&self) -> ChallengeType;

    /// Shared phase bookkeeping.
    fn phases(&self) -> &PhaseTracker;

    /// Opens phase 1 for a freshly enrolled participant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    async fn create_initial_phase(
        &self,
        participant: &Participant,
    ) -> Result<PhaseResult, DomainError> {
        self.phases().open_first(participant).await
    }

    /// Checks `text` against the participant's open phase and advances on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the participant has no open phase, the phase
    /// is not configured, or storage fails.
    async fn check_answer(
        &self,
        participant: &Participant,
        user: &User,
        challenge: &Challenge,
        info: &ChallengeInfo,
        text: &str,
    ) -> Result<CheckedResult, DomainError>;

    /// Advances past the open phase without checking an answer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the participant has no open phase or storage
    /// fails.
    async fn skip_question(
        &self,
        participant: &Participant,
        challenge: &Challenge,
    ) -> Result<CheckedResult, DomainError> {
        let current = self.phases().current(participant).await?;
        tracing::info!(
            user_id = participant.user_id,
            challenge_id = challenge.id,
            phase = current.phase,
            "question skipped"
        );
        self.phases().advance(participant, challenge, &current).await
    }
}

/// Builds the checker for a challenge type.
#[must_use]
pub fn checker_for(
    challenge_type: ChallengeType,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn AnswerChecker> {
    let phases = PhaseTracker::new(storage, clock);
    match challenge_type {
        ChallengeType::Regular => Arc::new(RegularChecker::new(phases)),
        ChallengeType::Story => Arc::new(StoryChecker::new(phases)),
    }
}
