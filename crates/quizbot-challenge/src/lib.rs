//! Quizbot challenge engine.
//!
//! Runs timed, multi-phase challenges for a chat audience: decides which
//! challenge is active, enrolls users, checks their answers phase by phase,
//! ranks finishers against the winner quota, and chains into the next
//! configured challenge. The `application` layer talks to storage and
//! transport only through the traits in `quizbot-core`.

pub mod application;
pub mod domain;

#[cfg(test)]
pub(crate) mod fixtures;
