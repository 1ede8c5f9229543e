//! Per-chat serialization of message handling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One async mutex per chat, created on first use.
///
/// Handling a message holds its chat's guard until the reply is sent.
/// Different chats never wait on each other.
#[derive(Debug, Default)]
pub struct ChatLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChatLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `chat_id`.
    pub fn lock_for(&self, chat_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(chat_id).or_default())
    }
}
