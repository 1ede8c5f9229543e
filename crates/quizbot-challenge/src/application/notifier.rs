//! Broadcasts of challenge status to every known user.

use std::sync::Arc;

use quizbot_core::error::DomainError;
use quizbot_core::response::{BotResponse, Markup};
use quizbot_core::storage::Storage;
use quizbot_core::transport::Transport;
use serde::Serialize;

use super::lifecycle::ChallengeManager;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends challenge announcements through a [`Transport`].
pub struct Notifier {
    manager: Arc<ChallengeManager>,
    storage: Arc<dyn Storage>,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    #[must_use]
    pub fn new(
        manager: Arc<ChallengeManager>,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            manager,
            storage,
            transport,
        }
    }

    /// Sends the status of a challenge to every user. A start announcement
    /// also carries the join prompt and the start button.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChallengeNotFound` for an unknown id, or a
    /// storage error. Delivery failures are counted, not returned.
    pub async fn notify(&self, challenge_id: i64, is_start: bool) -> Result<NotifyReport, DomainError> {
        let info = self.manager.get_challenge_info(Some(challenge_id)).await?;
        let mut replies = vec![info];
        let markup = if is_start {
            replies.push(self.manager.settings().messages.join_prompt.clone());
            Some(Markup::Start)
        } else {
            None
        };

        let mut report = NotifyReport::default();
        for user in self.storage.list_users().await? {
            let response = BotResponse {
                chat_id: user.chat_id,
                user_message: None,
                replies: replies.clone(),
                markup,
                split: true,
            };
            match self.transport.send(&response).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        user_id = user.id,
                        chat_id = user.chat_id,
                        challenge_id,
                        error = %e,
                        "notification not delivered"
                    );
                    report.failed += 1;
                }
            }
        }
        tracing::info!(
            challenge_id,
            is_start,
            delivered = report.delivered,
            failed = report.failed,
            "challenge broadcast"
        );
        Ok(report)
    }
}
