//! Inbound message handling.
//!
//! `QuizBot` classifies a message, gathers what the composer needs (the
//! user, the quiz state, the lifecycle outcome, random phrases, chitchat)
//! and returns the composed response.

use std::sync::{Arc, Mutex, PoisonError};

use quizbot_core::error::DomainError;
use quizbot_core::models::UserProfile;
use quizbot_core::response::BotResponse;
use quizbot_core::rng::{DeterministicRng, choose};
use quizbot_core::storage::Storage;
use uuid::Uuid;

use super::chitchat::Chitchat;
use super::composer::{self, Phrases, Reply};
use super::lifecycle::ChallengeManager;
use crate::domain::challenge_info::ChallengeType;
use crate::domain::state::{EvaluationStatus, QuizState};

/// A text message from a chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub profile: UserProfile,
    pub text: String,
}

/// What an inbound message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Start,
    Status,
    Skip,
    /// Anything else: an answer or small talk.
    Text,
}

impl Command {
    /// Classifies a message by its first word. A `@botname` suffix on the
    /// command is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let word = text.split_whitespace().next().unwrap_or_default();
        let command = word.split('@').next().unwrap_or_default();
        match command.to_lowercase().as_str() {
            "/help" => Self::Help,
            "/start" => Self::Start,
            "/status" => Self::Status,
            "/skip" => Self::Skip,
            _ => Self::Text,
        }
    }
}

/// The chat-facing side of the quiz.
pub struct QuizBot {
    manager: Arc<ChallengeManager>,
    storage: Arc<dyn Storage>,
    chitchat: Arc<dyn Chitchat>,
    rng: Mutex<Box<dyn DeterministicRng>>,
}

impl QuizBot {
    /// Creates a bot over a manager and its storage.
    #[must_use]
    pub fn new(
        manager: Arc<ChallengeManager>,
        storage: Arc<dyn Storage>,
        chitchat: Arc<dyn Chitchat>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            manager,
            storage,
            chitchat,
            rng: Mutex::new(rng),
        }
    }

    fn pick(&self, items: &[String]) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        choose(rng.as_mut(), items).cloned().unwrap_or_default()
    }

    async fn filler(&self, session: Uuid, text: &str) -> String {
        match self.chitchat.reply(session, text).await {
            Some(reply) => reply,
            None => self.pick(&self.manager.settings().messages.empty_messages),
        }
    }

    async fn phrases(&self, session: Uuid, text: &str, status: EvaluationStatus) -> Phrases {
        let messages = &self.manager.settings().messages;
        let needs_filler = matches!(
            status,
            EvaluationStatus::Incorrect | EvaluationStatus::NotChecked
        );
        Phrases {
            filler: if needs_filler {
                self.filler(session, text).await
            } else {
                String::new()
            },
            correct: self.pick(&messages.correct_answer_notifications),
            incorrect: self.pick(&messages.incorrect_answer_notifications),
        }
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if storage fails or the lifecycle hits a broken
    /// invariant. Conversational outcomes are always replies.
    pub async fn handle(&self, message: InboundMessage) -> Result<BotResponse, DomainError> {
        let command = Command::parse(&message.text);
        tracing::info!(
            chat_id = message.profile.chat_id,
            external_id = message.profile.external_id,
            ?command,
            "inbound message"
        );
        let reply = match command {
            Command::Help => self.help(&message.profile).await?,
            Command::Start => self.start(&message.profile).await?,
            Command::Status => self.status(&message.profile).await?,
            Command::Skip => self.skip(&message.profile).await?,
            Command::Text => self.text(&message).await?,
        };
        tracing::info!(
            chat_id = message.profile.chat_id,
            replies = reply.replies.len(),
            "reply composed"
        );
        Ok(reply.into_response(message.profile.chat_id, Some(message.text)))
    }

    async fn help(&self, profile: &UserProfile) -> Result<Reply, DomainError> {
        self.storage.get_or_create_user(profile).await?;
        let state = self.manager.current_state().await?;
        Ok(composer::help(&self.manager.settings().messages, state))
    }

    async fn start(&self, profile: &UserProfile) -> Result<Reply, DomainError> {
        let user = self.storage.get_or_create_user(profile).await?;
        let state = self.manager.current_state().await?;
        let outcome = if state == QuizState::InProgress {
            Some(self.manager.start_challenge_for_user(&user).await?)
        } else {
            None
        };
        Ok(composer::start(
            &self.manager.settings().messages,
            state,
            outcome,
        ))
    }

    async fn status(&self, profile: &UserProfile) -> Result<Reply, DomainError> {
        self.storage.get_or_create_user(profile).await?;
        let info = match self.manager.get_challenge_info(None).await {
            Ok(info) => Some(info),
            Err(DomainError::NoActiveChallenge) => None,
            Err(e) => return Err(e),
        };
        Ok(composer::status(&self.manager.settings().messages, info))
    }

    async fn skip(&self, profile: &UserProfile) -> Result<Reply, DomainError> {
        let user = self.storage.get_or_create_user(profile).await?;
        let evaluation = self.manager.skip_evaluation(&user).await?;
        Ok(composer::skip(&self.manager.settings().messages, evaluation))
    }

    async fn text(&self, message: &InboundMessage) -> Result<Reply, DomainError> {
        let messages = &self.manager.settings().messages;
        let Some(user) = self.storage.get_user(message.profile.external_id).await? else {
            tracing::warn!(
                external_id = message.profile.external_id,
                "message from unknown user"
            );
            let phrases = self
                .phrases(Uuid::new_v4(), &message.text, EvaluationStatus::NotChecked)
                .await;
            return Ok(composer::unknown_user(messages, phrases));
        };

        if self.manager.resolve_state().await? == QuizState::New {
            let phrases = self
                .phrases(user.chitchat_id, &message.text, EvaluationStatus::NotChecked)
                .await;
            return Ok(composer::idle(phrases));
        }

        let evaluation = self.manager.evaluate(&user, &message.text).await?;
        let challenge_type = self.challenge_type(evaluation.status).await?;
        let phrases = self
            .phrases(user.chitchat_id, &message.text, evaluation.status)
            .await;
        Ok(composer::answer(messages, evaluation, challenge_type, phrases))
    }

    /// Type of the running challenge; only incorrect answers need it.
    async fn challenge_type(
        &self,
        status: EvaluationStatus,
    ) -> Result<Option<ChallengeType>, DomainError> {
        if status != EvaluationStatus::Incorrect {
            return Ok(None);
        }
        let current = self.manager.current_challenge().await?;
        Ok(current.map(|active| active.info.challenge_type()))
    }
}
