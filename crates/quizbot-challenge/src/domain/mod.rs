//! Domain types of the challenge engine.

pub mod challenge_info;
pub mod settings;
pub mod state;
