//! Storage contract consumed by the challenge engine.
//!
//! Every call is expected to be atomic on its own; the engine never assumes a
//! transaction spanning several calls. Writes that decide the winner quota
//! (`finish_participation`, `finish_challenge`) are conditional so that
//! concurrent finishers observe a single transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::models::{
    Challenge, NewChallenge, Participant, PhaseResult, Pretender, User, UserProfile,
};

/// Persistence of challenge rows.
#[async_trait]
pub trait ChallengeStorage: Send + Sync {
    /// Insert a new, unfinished challenge.
    async fn create_challenge(&self, challenge: NewChallenge) -> Result<Challenge, DomainError>;

    /// The challenge with `finished_at = NULL`, if any.
    async fn get_actual_challenge(&self) -> Result<Option<Challenge>, DomainError>;

    /// Load a challenge by id.
    async fn get_challenge(&self, challenge_id: i64) -> Result<Option<Challenge>, DomainError>;

    /// The most recently created challenge.
    async fn get_last_challenge(&self) -> Result<Option<Challenge>, DomainError>;

    /// All challenges ordered by id.
    async fn list_challenges(&self) -> Result<Vec<Challenge>, DomainError>;

    /// Set `finished_at` if it is still unset.
    ///
    /// Returns the updated row when this call performed the transition and
    /// `None` when the challenge had already been finished.
    async fn finish_challenge(
        &self,
        challenge_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<Option<Challenge>, DomainError>;

    /// Ids of all finished challenges, ascending.
    async fn get_finished_challenge_ids(&self) -> Result<Vec<i64>, DomainError>;
}

/// Persistence of challenge enrollments.
#[async_trait]
pub trait ParticipantStorage: Send + Sync {
    /// Enroll a user. Returns the existing row if the user is already
    /// enrolled in the challenge.
    async fn create_participant(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Participant, DomainError>;

    /// The enrollment of `user_id` in `challenge_id`, if any.
    async fn get_participation(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Option<Participant>, DomainError>;

    /// Add one point to the participant's score.
    async fn increment_score(&self, participant_id: i64) -> Result<(), DomainError>;

    /// Set `finished_at` if it is still unset.
    async fn finish_participation(
        &self,
        participant_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Finished participants sorted by scores descending, then finish time
    /// ascending.
    async fn get_pretenders(&self, challenge_id: i64) -> Result<Vec<Pretender>, DomainError>;

    /// Whether at least `winner_amount` participants have finished.
    async fn has_all_winners(
        &self,
        challenge_id: i64,
        winner_amount: u32,
    ) -> Result<bool, DomainError>;
}

/// Persistence of per-phase progress.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Open a phase for a participant.
    async fn create_result(
        &self,
        participant_id: i64,
        phase: u32,
    ) -> Result<PhaseResult, DomainError>;

    /// Mark a phase result finished.
    async fn finish_phase(
        &self,
        result_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// The participant's highest phase result.
    async fn get_last_result(
        &self,
        participant_id: i64,
    ) -> Result<Option<PhaseResult>, DomainError>;
}

/// Persistence of known chat users.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Look up a user by external id, creating it if missing. An existing
    /// user's chat id is refreshed from the profile.
    async fn get_or_create_user(&self, profile: &UserProfile) -> Result<User, DomainError>;

    /// Look up a user by external id.
    async fn get_user(&self, external_id: i64) -> Result<Option<User>, DomainError>;

    /// All known users.
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
}

/// The full storage contract.
pub trait Storage: ChallengeStorage + ParticipantStorage + ResultStorage + UserStorage {}

impl<T> Storage for T where T: ChallengeStorage + ParticipantStorage + ResultStorage + UserStorage {}
