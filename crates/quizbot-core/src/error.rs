//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Expected conversational outcomes (incorrect answer, unknown user, quiz not
/// started) are never errors; they travel as data. Everything here is either
/// an infrastructure failure or a broken precondition that must surface to
/// the operator.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No challenge with the given id exists.
    #[error("challenge not found: {0}")]
    ChallengeNotFound(i64),

    /// An operation required an active challenge, but none is running.
    #[error("no active challenge")]
    NoActiveChallenge,

    /// A challenge was started while another one is still active.
    #[error("challenge {0} is still active")]
    ChallengeAlreadyActive(i64),

    /// Every configured challenge has already been played.
    #[error("quiz is finished: all configured challenges were played")]
    QuizFinished,

    /// More challenges were finished than the configuration declares.
    #[error("finished challenge count {finished} exceeds configured total {configured}")]
    ChallengeCountExceeded {
        /// Number of finished challenges in storage.
        finished: usize,
        /// Number of challenges in the configuration.
        configured: usize,
    },

    /// Persisted challenge history does not match the configuration.
    #[error("configuration drift: {0}")]
    ConfigurationDrift(String),

    /// A checker reported a correct answer without a next phase before the
    /// last phase.
    #[error("correct answer for non-final phase {phase} has no next phase")]
    MissingNextPhase {
        /// The phase that was answered.
        phase: u32,
    },

    /// A participant has no unfinished phase result.
    #[error("no open phase result for participant {0}")]
    PhaseResultNotFound(i64),

    /// A phase number is outside the challenge's configured phases.
    #[error("phase {phase} is out of range for challenge '{challenge}'")]
    PhaseOutOfRange {
        /// The requested phase.
        phase: u32,
        /// Challenge name.
        challenge: String,
    },

    /// A user that just finished is missing from the winners list.
    #[error("user {user_id} is not among the winners of challenge {challenge_id}")]
    WinnerNotFound {
        /// Internal user id.
        user_id: i64,
        /// Challenge id.
        challenge_id: i64,
    },

    /// A validation error in domain logic or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// A message could not be delivered to a chat.
    #[error("delivery error: {0}")]
    Delivery(String),
}
