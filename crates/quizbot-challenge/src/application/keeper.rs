//! Cache of the current challenge and its checker.
//!
//! Holds the active challenge, or the most recently finished one between
//! challenges. Only lifecycle transitions write to it; readers take
//! snapshots.

use std::sync::Arc;

use chrono::TimeDelta;
use quizbot_core::clock::Clock;
use quizbot_core::error::DomainError;
use quizbot_core::storage::Storage;
use tokio::sync::RwLock;

use super::checkers::{AnswerChecker, checker_for};
use crate::domain::state::ActiveChallenge;

#[derive(Default)]
struct Slot {
    active: Option<ActiveChallenge>,
    checker: Option<Arc<dyn AnswerChecker>>,
}

/// The current challenge with a checker matching its type.
pub struct ChallengeKeeper {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    slot: RwLock<Slot>,
}

impl ChallengeKeeper {
    /// Creates an empty keeper.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            slot: RwLock::new(Slot::default()),
        }
    }

    /// Replaces the held challenge. The checker is rebuilt only when the
    /// challenge type changes.
    pub async fn set(&self, active: ActiveChallenge) {
        let challenge_type = active.info.challenge_type();
        let mut slot = self.slot.write().await;
        let reusable = slot
            .checker
            .as_ref()
            .is_some_and(|checker| checker.challenge_type() == challenge_type);
        if !reusable {
            slot.checker = Some(checker_for(
                challenge_type,
                Arc::clone(&self.storage),
                Arc::clone(&self.clock),
            ));
        }
        slot.active = Some(active);
    }

    /// Forgets the held challenge.
    pub async fn clear(&self) {
        self.slot.write().await.active = None;
    }

    /// A copy of the held challenge, if any.
    pub async fn snapshot(&self) -> Option<ActiveChallenge> {
        self.slot.read().await.active.clone()
    }

    /// The held challenge with its checker.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveChallenge` if the keeper is empty.
    pub async fn current(&self) -> Result<(ActiveChallenge, Arc<dyn AnswerChecker>), DomainError> {
        let slot = self.slot.read().await;
        match (&slot.active, &slot.checker) {
            (Some(active), Some(checker)) => Ok((active.clone(), Arc::clone(checker))),
            _ => Err(DomainError::NoActiveChallenge),
        }
    }

    /// Time left in the held challenge's window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveChallenge` if the keeper is empty.
    pub async fn finish_after(&self) -> Result<TimeDelta, DomainError> {
        let (active, _) = self.current().await?;
        Ok(active.finish_after(self.clock.now()))
    }

    /// Whether the held challenge is finished.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveChallenge` if the keeper is empty.
    pub async fn finished(&self) -> Result<bool, DomainError> {
        Ok(self.current().await?.0.finished())
    }

    /// Whether the held challenge is unfinished but past its window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveChallenge` if the keeper is empty.
    pub async fn out_of_date(&self) -> Result<bool, DomainError> {
        let (active, _) = self.current().await?;
        Ok(active.out_of_date(self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use quizbot_core::models::Challenge;

    use super::*;
    use crate::domain::challenge_info::ChallengeType;
    use crate::fixtures::{self, Harness};

    fn active(harness_settings: &crate::domain::settings::QuizSettings, number: usize) -> ActiveChallenge {
        let info = harness_settings.challenges[number - 1].clone();
        ActiveChallenge {
            challenge: Challenge {
                id: i64::try_from(number).unwrap(),
                name: info.name.clone(),
                phase_amount: info.phase_amount(),
                winner_amount: info.max_winners,
                duration_secs: info.duration_secs,
                created_at: fixtures::start_time(),
                finished_at: None,
            },
            info: Arc::new(info),
            number,
        }
    }

    #[tokio::test]
    async fn test_empty_keeper_reports_no_active_challenge() {
        let harness = Harness::new(fixtures::settings(false));
        let keeper = ChallengeKeeper::new(harness.storage(), harness.clock());

        assert!(matches!(keeper.current().await, Err(DomainError::NoActiveChallenge)));
        assert!(matches!(keeper.out_of_date().await, Err(DomainError::NoActiveChallenge)));
        assert!(keeper.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_checker_follows_challenge_type() {
        // Arrange
        let settings = fixtures::settings(false);
        let harness = Harness::new(settings.clone());
        let keeper = ChallengeKeeper::new(harness.storage(), harness.clock());

        // Act
        keeper.set(active(&settings, 1)).await;
        let (_, first) = keeper.current().await.unwrap();
        keeper.set(active(&settings, 2)).await;
        let (_, second) = keeper.current().await.unwrap();
        keeper.set(active(&settings, 3)).await;
        let (_, third) = keeper.current().await.unwrap();

        // Assert
        assert_eq!(first.challenge_type(), ChallengeType::Regular);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(third.challenge_type(), ChallengeType::Story);
    }

    #[tokio::test]
    async fn test_derived_properties_follow_the_clock() {
        // Arrange
        let settings = fixtures::settings(false);
        let harness = Harness::new(settings.clone());
        let keeper = ChallengeKeeper::new(harness.storage(), harness.clock());
        let held = active(&settings, 1);
        let duration = held.challenge.duration();
        keeper.set(held).await;

        // Act
        let before = keeper.out_of_date().await.unwrap();
        harness.clock.advance(duration + TimeDelta::seconds(1));
        let after = keeper.out_of_date().await.unwrap();

        // Assert
        assert!(!before);
        assert!(after);
        assert!(!keeper.finished().await.unwrap());
        assert_eq!(keeper.finish_after().await.unwrap(), TimeDelta::seconds(-1));
    }

    #[tokio::test]
    async fn test_clear_empties_the_keeper() {
        let settings = fixtures::settings(false);
        let harness = Harness::new(settings.clone());
        let keeper = ChallengeKeeper::new(harness.storage(), harness.clock());
        keeper.set(active(&settings, 1)).await;

        keeper.clear().await;

        assert!(keeper.snapshot().await.is_none());
    }
}
