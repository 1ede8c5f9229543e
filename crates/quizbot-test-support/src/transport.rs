//! Test transports: mock `Transport` implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use quizbot_core::error::DomainError;
use quizbot_core::response::BotResponse;
use quizbot_core::transport::Transport;

/// A transport that records every response it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<BotResponse>>,
}

impl RecordingTransport {
    /// Create an empty recording transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all responses that were sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<BotResponse> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, response: &BotResponse) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(response.clone());
        Ok(())
    }
}

/// A transport that fails for the configured chat ids and records the rest.
#[derive(Debug)]
pub struct FailingTransport {
    failing_chats: HashSet<i64>,
    inner: RecordingTransport,
}

impl FailingTransport {
    /// Create a transport that rejects every chat in `failing_chats`.
    #[must_use]
    pub fn new(failing_chats: impl IntoIterator<Item = i64>) -> Self {
        Self {
            failing_chats: failing_chats.into_iter().collect(),
            inner: RecordingTransport::new(),
        }
    }

    /// Responses that were delivered successfully.
    pub fn sent(&self) -> Vec<BotResponse> {
        self.inner.sent()
    }
}

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, response: &BotResponse) -> Result<(), DomainError> {
        if self.failing_chats.contains(&response.chat_id) {
            return Err(DomainError::Delivery(format!(
                "chat {} unreachable",
                response.chat_id
            )));
        }
        self.inner.send(response).await
    }
}
