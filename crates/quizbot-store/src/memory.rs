//! In-process implementation of the storage contract.
//!
//! All tables live behind one mutex, so each call is atomic. Used when no
//! database is configured and as the storage of engine tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use quizbot_core::error::DomainError;
use quizbot_core::models::{
    Challenge, NewChallenge, Participant, PhaseResult, Pretender, User, UserProfile,
};
use quizbot_core::storage::{ChallengeStorage, ParticipantStorage, ResultStorage, UserStorage};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    challenges: Vec<Challenge>,
    participants: Vec<Participant>,
    results: Vec<PhaseResult>,
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX - 1) + 1
}

/// Storage that keeps every table in memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("storage lock poisoned: {e}")))
    }

    /// All phase results of a participant, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the storage lock is poisoned.
    pub fn results_for(&self, participant_id: i64) -> Result<Vec<PhaseResult>, DomainError> {
        Ok(self
            .tables()?
            .results
            .iter()
            .filter(|r| r.participant_id == participant_id)
            .cloned()
            .collect())
    }

    /// All participants of a challenge, in enrollment order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the storage lock is poisoned.
    pub fn participants_for(&self, challenge_id: i64) -> Result<Vec<Participant>, DomainError> {
        Ok(self
            .tables()?
            .participants
            .iter()
            .filter(|p| p.challenge_id == challenge_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChallengeStorage for InMemoryStorage {
    async fn create_challenge(&self, challenge: NewChallenge) -> Result<Challenge, DomainError> {
        let mut tables = self.tables()?;
        if let Some(active) = tables.challenges.iter().find(|c| c.finished_at.is_none()) {
            return Err(DomainError::ChallengeAlreadyActive(active.id));
        }
        let row = Challenge {
            id: next_id(tables.challenges.len()),
            name: challenge.name,
            phase_amount: challenge.phase_amount,
            winner_amount: challenge.winner_amount,
            duration_secs: challenge.duration_secs,
            created_at: challenge.created_at,
            finished_at: None,
        };
        tables.challenges.push(row.clone());
        Ok(row)
    }

    async fn get_actual_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        Ok(self
            .tables()?
            .challenges
            .iter()
            .find(|c| c.finished_at.is_none())
            .cloned())
    }

    async fn get_challenge(&self, challenge_id: i64) -> Result<Option<Challenge>, DomainError> {
        Ok(self
            .tables()?
            .challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .cloned())
    }

    async fn get_last_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        Ok(self.tables()?.challenges.last().cloned())
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, DomainError> {
        Ok(self.tables()?.challenges.clone())
    }

    async fn finish_challenge(
        &self,
        challenge_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<Option<Challenge>, DomainError> {
        let mut tables = self.tables()?;
        let challenge = tables
            .challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
            .ok_or(DomainError::ChallengeNotFound(challenge_id))?;
        if challenge.finished_at.is_some() {
            return Ok(None);
        }
        challenge.finished_at = Some(finished_at);
        Ok(Some(challenge.clone()))
    }

    async fn get_finished_challenge_ids(&self) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .tables()?
            .challenges
            .iter()
            .filter(|c| c.finished_at.is_some())
            .map(|c| c.id)
            .collect())
    }
}

#[async_trait]
impl ParticipantStorage for InMemoryStorage {
    async fn create_participant(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Participant, DomainError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .participants
            .iter()
            .find(|p| p.user_id == user_id && p.challenge_id == challenge_id)
        {
            return Ok(existing.clone());
        }
        let row = Participant {
            id: next_id(tables.participants.len()),
            user_id,
            challenge_id,
            scores: 0,
            finished_at: None,
        };
        tables.participants.push(row.clone());
        Ok(row)
    }

    async fn get_participation(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Option<Participant>, DomainError> {
        Ok(self
            .tables()?
            .participants
            .iter()
            .find(|p| p.user_id == user_id && p.challenge_id == challenge_id)
            .cloned())
    }

    async fn increment_score(&self, participant_id: i64) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        let participant = tables
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                DomainError::Infrastructure(format!("participant {participant_id} not found"))
            })?;
        participant.scores += 1;
        Ok(())
    }

    async fn finish_participation(
        &self,
        participant_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        let participant = tables
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                DomainError::Infrastructure(format!("participant {participant_id} not found"))
            })?;
        if participant.finished_at.is_none() {
            participant.finished_at = Some(finished_at);
        }
        Ok(())
    }

    async fn get_pretenders(&self, challenge_id: i64) -> Result<Vec<Pretender>, DomainError> {
        let tables = self.tables()?;
        let mut pretenders: Vec<Pretender> = tables
            .participants
            .iter()
            .filter(|p| p.challenge_id == challenge_id && p.finished_at.is_some())
            .filter_map(|p| {
                let user = tables.users.iter().find(|u| u.id == p.user_id)?;
                Some(Pretender {
                    participant: p.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        pretenders.sort_by(|a, b| {
            b.participant
                .scores
                .cmp(&a.participant.scores)
                .then(a.participant.finished_at.cmp(&b.participant.finished_at))
                .then(a.participant.id.cmp(&b.participant.id))
        });
        Ok(pretenders)
    }

    async fn has_all_winners(
        &self,
        challenge_id: i64,
        winner_amount: u32,
    ) -> Result<bool, DomainError> {
        let finished = self
            .tables()?
            .participants
            .iter()
            .filter(|p| p.challenge_id == challenge_id && p.finished_at.is_some())
            .count();
        Ok(finished >= winner_amount as usize)
    }
}

#[async_trait]
impl ResultStorage for InMemoryStorage {
    async fn create_result(
        &self,
        participant_id: i64,
        phase: u32,
    ) -> Result<PhaseResult, DomainError> {
        let mut tables = self.tables()?;
        if tables
            .results
            .iter()
            .any(|r| r.participant_id == participant_id && r.phase == phase)
        {
            return Err(DomainError::Infrastructure(format!(
                "participant {participant_id} already has a result for phase {phase}"
            )));
        }
        let row = PhaseResult {
            id: next_id(tables.results.len()),
            participant_id,
            phase,
            finished_at: None,
        };
        tables.results.push(row.clone());
        Ok(row)
    }

    async fn finish_phase(
        &self,
        result_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        let result = tables
            .results
            .iter_mut()
            .find(|r| r.id == result_id)
            .ok_or_else(|| DomainError::Infrastructure(format!("result {result_id} not found")))?;
        if result.finished_at.is_none() {
            result.finished_at = Some(finished_at);
        }
        Ok(())
    }

    async fn get_last_result(
        &self,
        participant_id: i64,
    ) -> Result<Option<PhaseResult>, DomainError> {
        Ok(self
            .tables()?
            .results
            .iter()
            .filter(|r| r.participant_id == participant_id)
            .max_by_key(|r| r.phase)
            .cloned())
    }
}

#[async_trait]
impl UserStorage for InMemoryStorage {
    async fn get_or_create_user(&self, profile: &UserProfile) -> Result<User, DomainError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .users
            .iter_mut()
            .find(|u| u.external_id == profile.external_id)
        {
            existing.chat_id = profile.chat_id;
            return Ok(existing.clone());
        }
        let user = User {
            id: next_id(tables.users.len()),
            external_id: profile.external_id,
            chat_id: profile.chat_id,
            chitchat_id: Uuid::new_v4(),
            nick_name: profile.nick_name.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, external_id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.tables()?.users.clone())
    }
}
