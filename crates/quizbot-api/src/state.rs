//! Shared application state.

use std::sync::Arc;

use quizbot_challenge::application::bot::QuizBot;
use quizbot_challenge::application::chitchat::Chitchat;
use quizbot_challenge::application::lifecycle::ChallengeManager;
use quizbot_challenge::application::locks::ChatLocks;
use quizbot_challenge::application::notifier::Notifier;
use quizbot_challenge::domain::settings::QuizSettings;
use quizbot_core::clock::Clock;
use quizbot_core::rng::DeterministicRng;
use quizbot_core::storage::Storage;

use crate::outbox::OutboxTransport;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chat-facing message handling.
    pub bot: Arc<QuizBot>,
    /// Challenge lifecycle.
    pub manager: Arc<ChallengeManager>,
    /// Broadcasts into the outbox.
    pub notifier: Arc<Notifier>,
    /// Queued broadcast messages per chat.
    pub outbox: Arc<OutboxTransport>,
    /// One guard per chat around handle-then-reply.
    pub chat_locks: Arc<ChatLocks>,
}

impl AppState {
    /// Wires the engine over `storage`.
    #[must_use]
    pub fn new(
        settings: Arc<QuizSettings>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
        chitchat: Arc<dyn Chitchat>,
    ) -> Self {
        let manager = Arc::new(ChallengeManager::new(settings, Arc::clone(&storage), clock));
        let outbox = Arc::new(OutboxTransport::new());
        let notifier = Arc::new(Notifier::new(
            Arc::clone(&manager),
            Arc::clone(&storage),
            outbox.clone(),
        ));
        let bot = Arc::new(QuizBot::new(
            Arc::clone(&manager),
            storage,
            chitchat,
            rng,
        ));
        Self {
            bot,
            manager,
            notifier,
            outbox,
            chat_locks: Arc::new(ChatLocks::new()),
        }
    }
}
