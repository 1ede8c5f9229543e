//! Quiz bot HTTP API.
//!
//! Exposes the bot's message handling, the challenge lifecycle and the
//! broadcast outbox over JSON.

pub mod chitchat;
pub mod config;
pub mod error;
pub mod outbox;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
