//! In-process transport that queues broadcast messages per chat until the
//! chat gateway collects them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use quizbot_core::error::DomainError;
use quizbot_core::response::{BotResponse, OutboundMessage};
use quizbot_core::transport::Transport;

/// Per-chat queues of undelivered messages.
#[derive(Debug, Default)]
pub struct OutboxTransport {
    queues: Mutex<HashMap<i64, Vec<OutboundMessage>>>,
}

impl OutboxTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued for `chat_id`, oldest first.
    pub fn drain(&self, chat_id: i64) -> Vec<OutboundMessage> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&chat_id)
            .unwrap_or_default()
    }

    /// Number of messages waiting for `chat_id`.
    pub fn pending(&self, chat_id: i64) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl Transport for OutboxTransport {
    async fn send(&self, response: &BotResponse) -> Result<(), DomainError> {
        let messages = response.messages();
        tracing::debug!(chat_id = response.chat_id, count = messages.len(), "messages queued");
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(response.chat_id)
            .or_default()
            .extend(messages);
        Ok(())
    }
}
