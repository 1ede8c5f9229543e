//! Quiz state and evaluation outcomes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use quizbot_core::models::{Challenge, User};
use serde::Serialize;

use crate::domain::challenge_info::ChallengeInfo;

/// Quiz-wide state derived from persisted challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    /// No challenge has been played yet.
    New,
    /// A challenge is active.
    InProgress,
    /// Some challenges are finished and more remain.
    WaitNext,
    /// Every configured challenge is finished.
    Finished,
}

impl QuizState {
    /// Ready for the next challenge to start.
    #[must_use]
    pub fn prepared(self) -> bool {
        matches!(self, Self::New | Self::WaitNext)
    }

    /// At least one challenge has been played to its end.
    #[must_use]
    pub fn delivered(self) -> bool {
        matches!(self, Self::WaitNext | Self::Finished)
    }
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::WaitNext => "wait_next",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// How an inbound answer was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Checked and accepted.
    Correct,
    /// Checked and rejected.
    Incorrect,
    /// Not checked: no active challenge or the user is not playing.
    NotChecked,
    /// Arrived after the challenge window closed.
    Expired,
}

/// Result of `evaluate` or `skip_evaluation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub status: EvaluationStatus,
    pub replies: Vec<String>,
    /// State after the evaluation, including any chained transition.
    pub quiz_state: QuizState,
}

impl Evaluation {
    #[must_use]
    pub fn new(status: EvaluationStatus, quiz_state: QuizState) -> Self {
        Self {
            status,
            replies: Vec::new(),
            quiz_state,
        }
    }

    #[must_use]
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }
}

/// Outcome of checking one answer against the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedResult {
    pub correct: bool,
    /// The phase that was evaluated.
    pub phase: u32,
    /// The phase opened by a correct answer; `None` after the last phase.
    pub next_phase: Option<u32>,
}

impl CheckedResult {
    /// A rejected answer for `phase`.
    #[must_use]
    pub fn incorrect(phase: u32) -> Self {
        Self {
            correct: false,
            phase,
            next_phase: None,
        }
    }
}

/// Outcome of `start_challenge_for_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The user was enrolled; carries the announcement and the first prompt.
    Enrolled { replies: Vec<String> },
    /// The user was already enrolled; carries the notice.
    AlreadyEnrolled { reply: String },
}

impl StartOutcome {
    /// Reply texts for the user.
    #[must_use]
    pub fn into_replies(self) -> Vec<String> {
        match self {
            Self::Enrolled { replies } => replies,
            Self::AlreadyEnrolled { reply } => vec![reply],
        }
    }
}

/// A ranked finisher of a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerResult {
    pub user: User,
    /// 1-based rank.
    pub position: u32,
    pub scores: i32,
    pub finished_at: DateTime<Utc>,
}

/// A persisted challenge joined with its configuration.
#[derive(Debug, Clone)]
pub struct ActiveChallenge {
    pub challenge: Challenge,
    pub info: Arc<ChallengeInfo>,
    /// 1-based position in the configured challenge list.
    pub number: usize,
}

impl ActiveChallenge {
    /// Time left until the window closes; negative once it has.
    #[must_use]
    pub fn finish_after(&self, now: DateTime<Utc>) -> TimeDelta {
        self.challenge
            .created_at
            .checked_add_signed(self.challenge.duration())
            .map_or(TimeDelta::MAX, |deadline| deadline - now)
    }

    #[must_use]
    pub fn finished(&self) -> bool {
        self.challenge.is_finished()
    }

    /// Unfinished but past its window.
    #[must_use]
    pub fn out_of_date(&self, now: DateTime<Utc>) -> bool {
        !self.finished() && self.finish_after(now) < TimeDelta::zero()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::fixtures;

    fn active(duration_secs: i64, finished: bool) -> (ActiveChallenge, DateTime<Utc>) {
        let created_at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let settings = fixtures::settings(false);
        let challenge = Challenge {
            id: 1,
            name: settings.challenges[0].name.clone(),
            phase_amount: 2,
            winner_amount: 1,
            duration_secs,
            created_at,
            finished_at: finished.then_some(created_at),
        };
        (
            ActiveChallenge {
                challenge,
                info: Arc::new(settings.challenges[0].clone()),
                number: 1,
            },
            created_at,
        )
    }

    #[test]
    fn test_prepared_and_delivered() {
        assert!(QuizState::New.prepared());
        assert!(QuizState::WaitNext.prepared());
        assert!(!QuizState::InProgress.prepared());
        assert!(!QuizState::Finished.prepared());

        assert!(QuizState::WaitNext.delivered());
        assert!(QuizState::Finished.delivered());
        assert!(!QuizState::New.delivered());
        assert!(!QuizState::InProgress.delivered());
    }

    #[test]
    fn test_out_of_date_is_recomputed_from_now() {
        let (active, created_at) = active(60, false);

        assert!(!active.out_of_date(created_at + TimeDelta::seconds(59)));
        assert!(!active.out_of_date(created_at + TimeDelta::seconds(60)));
        assert!(active.out_of_date(created_at + TimeDelta::seconds(61)));
        assert_eq!(
            active.finish_after(created_at + TimeDelta::seconds(20)),
            TimeDelta::seconds(40)
        );
    }

    #[test]
    fn test_oversized_window_never_expires() {
        let (active, created_at) = active(10_000_000_000_000_000, false);

        assert!(!active.out_of_date(created_at + TimeDelta::days(3650)));
        assert!(active.finish_after(created_at) > TimeDelta::days(3650));
    }

    #[test]
    fn test_finished_challenge_is_never_out_of_date() {
        let (active, created_at) = active(60, true);
        assert!(active.finished());
        assert!(!active.out_of_date(created_at + TimeDelta::days(2)));
    }

    #[test]
    fn test_start_outcome_replies() {
        let enrolled = StartOutcome::Enrolled {
            replies: vec!["a".to_owned(), "b".to_owned()],
        };
        let already = StartOutcome::AlreadyEnrolled {
            reply: "c".to_owned(),
        };
        assert_eq!(enrolled.into_replies(), vec!["a", "b"]);
        assert_eq!(already.into_replies(), vec!["c"]);
    }
}
