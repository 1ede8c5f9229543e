//! Challenge lifecycle.
//!
//! `ChallengeManager` owns the quiz state machine:
//!
//! ```text
//! New --start--> InProgress --quota met / expired--> WaitNext --start--> InProgress ...
//!                                                  \--last challenge--> Finished
//! ```
//!
//! The state is always derived from storage; nothing here holds a lock over
//! the whole quiz. The winner quota relies on conditional storage writes:
//! only the caller whose `finish_challenge` actually transitions the row
//! chains into the next challenge.

use std::sync::Arc;

use quizbot_core::clock::Clock;
use quizbot_core::error::DomainError;
use quizbot_core::models::{Challenge, NewChallenge, Participant, User};
use quizbot_core::storage::Storage;

use super::checkers::AnswerChecker;
use super::keeper::ChallengeKeeper;
use super::registrar::Registrar;
use crate::domain::challenge_info::{ChallengeInfo, ChallengeType};
use crate::domain::settings::QuizSettings;
use crate::domain::state::{
    ActiveChallenge, CheckedResult, Evaluation, EvaluationStatus, QuizState, StartOutcome,
};

/// A user playing the active challenge.
struct Enrollment {
    active: ActiveChallenge,
    checker: Arc<dyn AnswerChecker>,
    participant: Participant,
}

/// Drives challenges through their lifecycle.
pub struct ChallengeManager {
    settings: Arc<QuizSettings>,
    infos: Vec<Arc<ChallengeInfo>>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    keeper: ChallengeKeeper,
    registrar: Registrar,
}

impl ChallengeManager {
    /// Creates a manager for a validated configuration.
    #[must_use]
    pub fn new(
        settings: Arc<QuizSettings>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let infos = settings
            .challenges
            .iter()
            .cloned()
            .map(Arc::new)
            .collect();
        Self {
            infos,
            keeper: ChallengeKeeper::new(Arc::clone(&storage), Arc::clone(&clock)),
            registrar: Registrar::new(Arc::clone(&storage), Arc::clone(&clock)),
            settings,
            storage,
            clock,
        }
    }

    /// The quiz configuration.
    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    fn active_from(&self, challenge: Challenge) -> Result<ActiveChallenge, DomainError> {
        let (number, _) = self.settings.find_by_name(&challenge.name).ok_or_else(|| {
            DomainError::ConfigurationDrift(format!(
                "challenge '{}' (id {}) is not configured",
                challenge.name, challenge.id
            ))
        })?;
        Ok(ActiveChallenge {
            info: Arc::clone(&self.infos[number - 1]),
            challenge,
            number,
        })
    }

    /// Checks persisted history against the configuration, resolves the
    /// state and, with autostart, starts the next challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConfigurationDrift` if a persisted challenge does
    /// not match the configured challenge at its position, and
    /// `DomainError::ChallengeCountExceeded` if storage holds more challenges
    /// than configured.
    pub async fn bootstrap(&self) -> Result<QuizState, DomainError> {
        let history = self.storage.list_challenges().await?;
        let configured = self.settings.challenge_amount();
        if history.len() > configured {
            return Err(DomainError::ChallengeCountExceeded {
                finished: history.len(),
                configured,
            });
        }
        for (challenge, info) in history.iter().zip(&self.settings.challenges) {
            if challenge.name != info.name {
                return Err(DomainError::ConfigurationDrift(format!(
                    "challenge {} is '{}' in storage but '{}' in configuration",
                    challenge.id, challenge.name, info.name
                )));
            }
        }

        let state = self.resolve_state().await?;
        tracing::info!(%state, autostart = self.settings.autostart, "quiz bootstrapped");
        if self.settings.autostart && state.prepared() {
            return self.start_next_challenge().await;
        }
        Ok(state)
    }

    async fn resolve(&self) -> Result<(QuizState, usize), DomainError> {
        if let Some(actual) = self.storage.get_actual_challenge().await? {
            let active = self.active_from(actual)?;
            self.keeper.set(active).await;
            let finished = self.storage.get_finished_challenge_ids().await?.len();
            return Ok((QuizState::InProgress, finished));
        }

        let finished = self.storage.get_finished_challenge_ids().await?.len();
        let configured = self.settings.challenge_amount();
        let state = match finished {
            0 => QuizState::New,
            n if n < configured => QuizState::WaitNext,
            n if n == configured => QuizState::Finished,
            n => {
                return Err(DomainError::ChallengeCountExceeded {
                    finished: n,
                    configured,
                });
            }
        };
        match self.storage.get_last_challenge().await? {
            Some(last) => self.keeper.set(self.active_from(last)?).await,
            None => self.keeper.clear().await,
        }
        Ok((state, finished))
    }

    /// Derives the quiz state from storage and refreshes the keeper.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChallengeCountExceeded` if more challenges are
    /// finished than configured.
    pub async fn resolve_state(&self) -> Result<QuizState, DomainError> {
        Ok(self.resolve().await?.0)
    }

    /// Starts the next configured challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChallengeAlreadyActive` if a challenge is
    /// running and `DomainError::QuizFinished` if none is left.
    pub async fn start_next_challenge(&self) -> Result<QuizState, DomainError> {
        let (state, finished) = self.resolve().await?;
        match state {
            QuizState::InProgress => {
                let (active, _) = self.keeper.current().await?;
                return Err(DomainError::ChallengeAlreadyActive(active.challenge.id));
            }
            QuizState::Finished => return Err(DomainError::QuizFinished),
            QuizState::New | QuizState::WaitNext => {}
        }

        let number = finished + 1;
        let info = self
            .infos
            .get(finished)
            .cloned()
            .ok_or(DomainError::QuizFinished)?;
        let challenge = self
            .storage
            .create_challenge(NewChallenge {
                name: info.name.clone(),
                phase_amount: info.phase_amount(),
                winner_amount: info.max_winners,
                duration_secs: info.duration_secs,
                created_at: self.clock.now(),
            })
            .await?;
        tracing::info!(
            challenge_id = challenge.id,
            number,
            name = %info.name,
            "challenge started"
        );
        self.keeper
            .set(ActiveChallenge {
                challenge,
                info,
                number,
            })
            .await;
        Ok(QuizState::InProgress)
    }

    /// Finishes an expired challenge. Returns the state afterwards, or
    /// `None` if the current challenge is still open.
    async fn expire_if_needed(&self, state: QuizState) -> Result<Option<QuizState>, DomainError> {
        if state != QuizState::InProgress {
            return Ok(None);
        }
        let (active, _) = self.keeper.current().await?;
        if !active.out_of_date(self.clock.now()) {
            return Ok(None);
        }
        let transitioned = self
            .storage
            .finish_challenge(active.challenge.id, self.clock.now())
            .await?;
        let mut state = self.resolve_state().await?;
        if transitioned.is_some() {
            tracing::info!(
                challenge_id = active.challenge.id,
                number = active.number,
                "challenge expired"
            );
            if self.settings.autostart && state == QuizState::WaitNext {
                state = self.start_next_challenge().await?;
            }
        }
        Ok(Some(state))
    }

    /// The quiz state with an expired challenge already closed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails or a chained start is rejected.
    pub async fn current_state(&self) -> Result<QuizState, DomainError> {
        let state = self.resolve_state().await?;
        Ok(self.expire_if_needed(state).await?.unwrap_or(state))
    }

    /// Enrolls the user in the active challenge. Calling it again for the
    /// same user has no effect beyond a notice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveChallenge` if no challenge is running.
    pub async fn start_challenge_for_user(&self, user: &User) -> Result<StartOutcome, DomainError> {
        if self.current_state().await? != QuizState::InProgress {
            return Err(DomainError::NoActiveChallenge);
        }
        let (active, checker) = self.keeper.current().await?;
        let challenge_id = active.challenge.id;

        if self
            .registrar
            .get_participation_for_user(user, challenge_id)
            .await?
            .is_some()
        {
            return Ok(StartOutcome::AlreadyEnrolled {
                reply: self.settings.already_started_notification(&active.info),
            });
        }

        let participant = self
            .registrar
            .create_participation_for_user(user, challenge_id)
            .await?;
        let first = checker.create_initial_phase(&participant).await?;
        Ok(StartOutcome::Enrolled {
            replies: vec![
                self.settings.start_notification(active.number, &active.info),
                self.settings
                    .next_answer_notification(first.phase, active.info.question(first.phase)?),
            ],
        })
    }

    async fn enrolled(&self, user: &User) -> Result<Result<Enrollment, Evaluation>, DomainError> {
        let state = self.resolve_state().await?;
        if state != QuizState::InProgress {
            return Ok(Err(Evaluation::new(EvaluationStatus::NotChecked, state)));
        }
        if let Some(state) = self.expire_if_needed(state).await? {
            return Ok(Err(Evaluation::new(EvaluationStatus::Expired, state)
                .with_replies(vec![self.settings.messages.out_of_date_info.clone()])));
        }

        let (active, checker) = self.keeper.current().await?;
        match self
            .registrar
            .get_participation_for_user(user, active.challenge.id)
            .await?
        {
            Some(participant) if !participant.completed_challenge() => Ok(Ok(Enrollment {
                active,
                checker,
                participant,
            })),
            _ => Ok(Err(Evaluation::new(
                EvaluationStatus::NotChecked,
                QuizState::InProgress,
            ))),
        }
    }

    /// Checks an answer of the user against the active challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails or the phase bookkeeping is
    /// inconsistent.
    pub async fn evaluate(&self, user: &User, text: &str) -> Result<Evaluation, DomainError> {
        let Enrollment {
            active,
            checker,
            participant,
        } = match self.enrolled(user).await? {
            Ok(enrolled) => enrolled,
            Err(evaluation) => return Ok(evaluation),
        };

        let checked = checker
            .check_answer(&participant, user, &active.challenge, &active.info, text)
            .await?;
        if !checked.correct {
            return Ok(Evaluation::new(
                EvaluationStatus::Incorrect,
                QuizState::InProgress,
            ));
        }
        if active.info.challenge_type() == ChallengeType::Regular {
            self.registrar.add_correct_answer(&participant).await?;
        }
        self.advance(user, &participant, &active, checked).await
    }

    /// Moves the user past the current phase without scoring.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails or the phase bookkeeping is
    /// inconsistent.
    pub async fn skip_evaluation(&self, user: &User) -> Result<Evaluation, DomainError> {
        let Enrollment {
            active,
            checker,
            participant,
        } = match self.enrolled(user).await? {
            Ok(enrolled) => enrolled,
            Err(evaluation) => return Ok(evaluation),
        };
        let checked = checker
            .skip_question(&participant, &active.challenge)
            .await?;
        self.advance(user, &participant, &active, checked).await
    }

    async fn advance(
        &self,
        user: &User,
        participant: &Participant,
        active: &ActiveChallenge,
        checked: CheckedResult,
    ) -> Result<Evaluation, DomainError> {
        if let Some(next_phase) = checked.next_phase {
            let prompt = self
                .settings
                .next_answer_notification(next_phase, active.info.question(next_phase)?);
            return Ok(Evaluation::new(EvaluationStatus::Correct, QuizState::InProgress)
                .with_replies(vec![prompt]));
        }
        if checked.phase < active.challenge.phase_amount {
            return Err(DomainError::MissingNextPhase {
                phase: checked.phase,
            });
        }

        self.registrar.finish_participation(participant).await?;
        let winner = self
            .registrar
            .get_winner_result(user, &active.challenge)
            .await?;
        tracing::info!(
            user_id = user.id,
            user = %user.full_name(),
            challenge_id = active.challenge.id,
            position = winner.position,
            scores = winner.scores,
            "participant finished challenge"
        );
        let mut replies = vec![self.settings.pretender_notification(&active.info, &winner)];
        if !self.registrar.all_winners_exist(&active.challenge).await? {
            return Ok(Evaluation::new(EvaluationStatus::Correct, QuizState::InProgress)
                .with_replies(replies));
        }

        let state = self.finish_and_chain(user, active, &mut replies).await?;
        Ok(Evaluation::new(EvaluationStatus::Correct, state).with_replies(replies))
    }

    async fn finish_and_chain(
        &self,
        user: &User,
        active: &ActiveChallenge,
        replies: &mut Vec<String>,
    ) -> Result<QuizState, DomainError> {
        let transitioned = self
            .storage
            .finish_challenge(active.challenge.id, self.clock.now())
            .await?;
        let state = self.resolve_state().await?;
        if transitioned.is_none() {
            return Ok(state);
        }
        tracing::info!(
            challenge_id = active.challenge.id,
            number = active.number,
            name = %active.info.name,
            "challenge finished with all winners"
        );

        match state {
            QuizState::WaitNext if self.settings.autostart => self.chain_next(user, replies).await,
            QuizState::Finished => {
                replies.push(self.settings.messages.post_end_info.clone());
                Ok(state)
            }
            other => Ok(other),
        }
    }

    /// Starts the following challenge and enrolls `user` in it. An admin start
    /// may win the race; the user is enrolled in that challenge instead.
    async fn chain_next(
        &self,
        user: &User,
        replies: &mut Vec<String>,
    ) -> Result<QuizState, DomainError> {
        let state = match self.start_next_challenge().await {
            Ok(state) => state,
            Err(DomainError::ChallengeAlreadyActive(challenge_id)) => {
                tracing::info!(challenge_id, "next challenge already started");
                QuizState::InProgress
            }
            Err(e) => return Err(e),
        };
        let outcome = self.start_challenge_for_user(user).await?;
        replies.extend(outcome.into_replies());
        Ok(state)
    }

    /// Status text of a challenge; defaults to the current one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChallengeNotFound` for an unknown id and
    /// `DomainError::NoActiveChallenge` if no challenge was ever started.
    pub async fn get_challenge_info(&self, challenge_id: Option<i64>) -> Result<String, DomainError> {
        let active = match challenge_id {
            Some(id) => {
                let challenge = self
                    .storage
                    .get_challenge(id)
                    .await?
                    .ok_or(DomainError::ChallengeNotFound(id))?;
                self.active_from(challenge)?
            }
            None => {
                self.resolve_state().await?;
                self.keeper.current().await?.0
            }
        };
        let winners = if active.finished() {
            self.registrar.get_winners(&active.challenge).await?
        } else {
            Vec::new()
        };
        Ok(self
            .settings
            .challenge_info(&active, &winners, self.clock.now()))
    }

    /// The challenge the keeper holds after refreshing from storage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails.
    pub async fn current_challenge(&self) -> Result<Option<ActiveChallenge>, DomainError> {
        self.resolve_state().await?;
        Ok(self.keeper.snapshot().await)
    }

    /// Looks up a persisted challenge with its configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChallengeNotFound` for an unknown id.
    pub async fn challenge(&self, challenge_id: i64) -> Result<ActiveChallenge, DomainError> {
        let challenge = self
            .storage
            .get_challenge(challenge_id)
            .await?
            .ok_or(DomainError::ChallengeNotFound(challenge_id))?;
        self.active_from(challenge)
    }
}
