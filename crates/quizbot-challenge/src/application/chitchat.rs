//! Conversational fallback replies.

use async_trait::async_trait;
use uuid::Uuid;

/// A source of small-talk replies for messages the quiz does not handle.
#[async_trait]
pub trait Chitchat: Send + Sync {
    /// A reply to `text` within the conversation `session`, or `None` to fall
    /// back to a canned phrase.
    async fn reply(&self, session: Uuid, text: &str) -> Option<String>;
}

/// Never replies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChitchat;

#[async_trait]
impl Chitchat for SilentChitchat {
    async fn reply(&self, _session: Uuid, _text: &str) -> Option<String> {
        None
    }
}
