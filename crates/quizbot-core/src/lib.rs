//! Quizbot Core: shared domain abstractions.
//!
//! This crate defines the persisted models, the storage and transport
//! contracts, and the clock/RNG seams that the challenge engine depends on.
//! It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod models;
pub mod response;
pub mod rng;
pub mod storage;
pub mod transport;
