//! Transport abstraction for delivering bot responses to chats.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::response::BotResponse;

/// Delivers responses to the chat network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send every message of `response` to its chat.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Delivery` if the chat could not be reached.
    async fn send(&self, response: &BotResponse) -> Result<(), DomainError>;
}
