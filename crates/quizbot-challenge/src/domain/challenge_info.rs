//! Static challenge configuration.
//!
//! A `ChallengeInfo` describes one configured challenge: its prompts, the
//! accepted answers, the time window and the winner quota. It is loaded once
//! at startup and never changes afterwards.

use quizbot_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default time window: one day.
const DEFAULT_DURATION_SECS: i64 = 86_400;

/// Longest accepted time window: one year.
pub const MAX_DURATION_SECS: i64 = 366 * DEFAULT_DURATION_SECS;

fn default_duration_secs() -> i64 {
    DEFAULT_DURATION_SECS
}

fn default_max_winners() -> u32 {
    1
}

/// Selects the answer checker for a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// Question/answer phases matched by substring.
    Regular,
    /// Scripted multi-line answers.
    Story,
}

/// Accepted answers for one question: a single string or a list of
/// alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerVariants {
    /// Exactly one accepted answer.
    One(String),
    /// Any of several accepted answers.
    Many(Vec<String>),
}

impl AnswerVariants {
    /// All accepted answers.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        match self {
            Self::One(answer) => std::slice::from_ref(answer),
            Self::Many(answers) => answers,
        }
    }
}

/// One expected line of a story answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    /// Keyword the line must contain, unless a preposition is used instead.
    pub step: String,
    /// Alternatives accepted in place of `step`.
    #[serde(default)]
    pub prepositions: Vec<String>,
    /// Phrase the line must contain.
    pub construction: String,
    /// Free text the line must contain; `{username}` stands for the user's
    /// handle.
    pub text: String,
}

/// One phase of a story challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPhase {
    /// Prompt shown to the participant.
    pub question: String,
    /// Expected answer, one item per line.
    pub script: Vec<StoryItem>,
}

/// Phases of a challenge, tagged by `type` in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeKind {
    /// One question per phase with substring-matched answers.
    Regular {
        /// Prompts, one per phase.
        questions: Vec<String>,
        /// Accepted answers, parallel to `questions`.
        answers: Vec<AnswerVariants>,
    },
    /// One scripted prompt per phase.
    Story {
        /// Phases in order.
        phases: Vec<StoryPhase>,
    },
}

/// A configured challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    /// Unique name; persisted challenges refer to their configuration by it.
    pub name: String,
    /// Shown in the start announcement.
    #[serde(default)]
    pub description: String,
    /// Time window in seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: i64,
    /// Winner quota.
    #[serde(default = "default_max_winners")]
    pub max_winners: u32,
    /// Phases and how they are checked.
    #[serde(flatten)]
    pub kind: ChallengeKind,
}

impl ChallengeInfo {
    /// The checker this challenge needs.
    #[must_use]
    pub fn challenge_type(&self) -> ChallengeType {
        match self.kind {
            ChallengeKind::Regular { .. } => ChallengeType::Regular,
            ChallengeKind::Story { .. } => ChallengeType::Story,
        }
    }

    /// Number of phases.
    #[must_use]
    pub fn phase_amount(&self) -> u32 {
        let len = match &self.kind {
            ChallengeKind::Regular { questions, .. } => questions.len(),
            ChallengeKind::Story { phases } => phases.len(),
        };
        u32::try_from(len).unwrap_or(u32::MAX)
    }

    fn index(&self, phase: u32) -> Result<usize, DomainError> {
        if phase == 0 || phase > self.phase_amount() {
            return Err(DomainError::PhaseOutOfRange {
                phase,
                challenge: self.name.clone(),
            });
        }
        Ok(phase as usize - 1)
    }

    /// Prompt for a 1-based phase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PhaseOutOfRange` if the phase does not exist.
    pub fn question(&self, phase: u32) -> Result<&str, DomainError> {
        let index = self.index(phase)?;
        Ok(match &self.kind {
            ChallengeKind::Regular { questions, .. } => &questions[index],
            ChallengeKind::Story { phases } => &phases[index].question,
        })
    }

    /// Accepted answers for a 1-based phase of a regular challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PhaseOutOfRange` if the phase does not exist and
    /// `DomainError::Validation` for a story challenge.
    pub fn answer_variants(&self, phase: u32) -> Result<&AnswerVariants, DomainError> {
        let index = self.index(phase)?;
        match &self.kind {
            ChallengeKind::Regular { answers, .. } => Ok(&answers[index]),
            ChallengeKind::Story { .. } => Err(DomainError::Validation(format!(
                "challenge '{}' has no answer variants",
                self.name
            ))),
        }
    }

    /// Expected script for a 1-based phase of a story challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PhaseOutOfRange` if the phase does not exist and
    /// `DomainError::Validation` for a regular challenge.
    pub fn script(&self, phase: u32) -> Result<&[StoryItem], DomainError> {
        let index = self.index(phase)?;
        match &self.kind {
            ChallengeKind::Story { phases } => Ok(&phases[index].script),
            ChallengeKind::Regular { .. } => Err(DomainError::Validation(format!(
                "challenge '{}' has no story script",
                self.name
            ))),
        }
    }

    /// Checks the configuration invariants of a single challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first violated rule.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fail = |reason: &str| {
            Err(DomainError::Validation(format!(
                "challenge '{}': {reason}",
                self.name
            )))
        };
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("challenge name is empty".to_owned()));
        }
        if self.max_winners == 0 {
            return fail("max_winners must be at least 1");
        }
        if self.duration_secs <= 0 {
            return fail("duration must be positive");
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return fail(&format!("duration exceeds {MAX_DURATION_SECS} seconds"));
        }
        if self.phase_amount() == 0 {
            return fail("no phases configured");
        }
        match &self.kind {
            ChallengeKind::Regular { questions, answers } => {
                if questions.len() != answers.len() {
                    return fail(&format!(
                        "{} questions but {} answer sets",
                        questions.len(),
                        answers.len()
                    ));
                }
                let blank = |answers: &AnswerVariants| {
                    answers.variants().is_empty()
                        || answers.variants().iter().any(|a| a.trim().is_empty())
                };
                if answers.iter().any(blank) {
                    return fail("empty answer set");
                }
            }
            ChallengeKind::Story { phases } => {
                if phases.iter().any(|phase| phase.script.is_empty()) {
                    return fail("empty story script");
                }
            }
        }
        Ok(())
    }
}
