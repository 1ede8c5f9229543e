//! Persisted records shared by the engine and the storage adapters.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A chat user known to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Internal identifier.
    pub id: i64,
    /// Identifier on the chat network.
    pub external_id: i64,
    /// Chat the bot talks to this user in.
    pub chat_id: i64,
    /// Session identifier handed to the chitchat service.
    pub chitchat_id: Uuid,
    /// Public handle, without the `@`.
    pub nick_name: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

impl User {
    /// The name a story script refers to the user by: nick name, else first
    /// name, else the external id.
    #[must_use]
    pub fn handle(&self) -> String {
        self.nick_name
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| self.external_id.to_string())
    }

    /// Human-readable name for logs.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut name = self.first_name.clone().unwrap_or_default();
        if let Some(last_name) = &self.last_name {
            name.push(' ');
            name.push_str(last_name);
        }
        if let Some(nick_name) = &self.nick_name {
            name.push_str(" @");
            name.push_str(nick_name);
        }
        name.trim().to_owned()
    }
}

/// Profile data of an inbound message sender, used to register users.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    /// Identifier on the chat network.
    pub external_id: i64,
    /// Chat the message arrived in.
    pub chat_id: i64,
    /// Public handle.
    pub nick_name: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

/// One played (or running) challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Challenge {
    /// Row identifier.
    pub id: i64,
    /// Configured challenge name.
    pub name: String,
    /// Number of phases a participant must complete.
    pub phase_amount: u32,
    /// Winner quota.
    pub winner_amount: u32,
    /// Time budget in seconds.
    pub duration_secs: i64,
    /// Start time.
    pub created_at: DateTime<Utc>,
    /// Finish time; `None` while the challenge is active.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// Time budget as a `TimeDelta`, saturating for out-of-range rows.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.duration_secs).unwrap_or(if self.duration_secs < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        })
    }

    /// Returns `true` once the challenge has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Data for creating a challenge row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChallenge {
    /// Configured challenge name.
    pub name: String,
    /// Number of phases.
    pub phase_amount: u32,
    /// Winner quota.
    pub winner_amount: u32,
    /// Time budget in seconds.
    pub duration_secs: i64,
    /// Start time.
    pub created_at: DateTime<Utc>,
}

/// A user's enrollment in one challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Row identifier.
    pub id: i64,
    /// Enrolled user.
    pub user_id: i64,
    /// Challenge the user is enrolled in.
    pub challenge_id: i64,
    /// Correct answers so far.
    pub scores: i32,
    /// When the user completed the last phase.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Returns `true` once every phase has been completed.
    #[must_use]
    pub fn completed_challenge(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// A participant that finished the challenge, joined with its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pretender {
    /// The finished participant.
    pub participant: Participant,
    /// The participant's user.
    pub user: User,
}

/// Progress record for one phase of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseResult {
    /// Row identifier.
    pub id: i64,
    /// Owning participant.
    pub participant_id: i64,
    /// 1-based phase number.
    pub phase: u32,
    /// When the phase was answered or skipped.
    pub finished_at: Option<DateTime<Utc>>,
}
