//! Shared test mocks and utilities for the quizbot challenge engine.

mod clock;
mod rng;
mod storage;
mod transport;

pub use clock::{FixedClock, ManualClock};
pub use rng::{MockRng, SequenceRng};
pub use storage::FailingStorage;
pub use transport::{FailingTransport, RecordingTransport};
