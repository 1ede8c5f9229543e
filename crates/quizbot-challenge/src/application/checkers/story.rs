//! Scripted multi-line answers.
//!
//! A story answer has one line per script item. Line `i` passes when it
//! contains the item's step keyword (or one of its prepositions), its
//! construction, and its text with `{username}` replaced by the user's
//! handle. All comparisons are case-insensitive.

use async_trait::async_trait;
use quizbot_core::error::DomainError;
use quizbot_core::models::{Challenge, Participant, User};

use super::{AnswerChecker, PhaseTracker};
use crate::domain::challenge_info::{ChallengeInfo, ChallengeType, StoryItem};
use crate::domain::state::CheckedResult;

const USERNAME_PLACEHOLDER: &str = "{username}";

fn lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}

fn line_matches(line: &str, item: &StoryItem, handle: &str) -> bool {
    let step = std::iter::once(&item.step)
        .chain(&item.prepositions)
        .any(|keyword| line.contains(&keyword.to_lowercase()));
    let text = item.text.replace(USERNAME_PLACEHOLDER, handle).to_lowercase();
    step && line.contains(&item.construction.to_lowercase()) && line.contains(&text)
}

fn matches(script: &[StoryItem], handle: &str, answer: &str) -> bool {
    let lines = lines(answer);
    if lines.len() != script.len() {
        tracing::debug!(
            lines = lines.len(),
            expected = script.len(),
            "story line count mismatch"
        );
        return false;
    }
    lines
        .iter()
        .zip(script)
        .all(|(line, item)| line_matches(line, item, handle))
}

/// Checker for `ChallengeType::Story`.
pub struct StoryChecker {
    phases: PhaseTracker,
}

impl StoryChecker {
    #[must_use]
    pub fn new(phases: PhaseTracker) -> Self {
        Self { phases }
    }
}

#[async_trait]
impl AnswerChecker for StoryChecker {
    fn challenge_type(&self) -> ChallengeType {
        ChallengeType::Story
    }

    fn phases(&self) -> &PhaseTracker {
        &self.phases
    }

    async fn check_answer(
        &self,
        participant: &Participant,
        user: &User,
        challenge: &Challenge,
        info: &ChallengeInfo,
        text: &str,
    ) -> Result<CheckedResult, DomainError> {
        let current = self.phases.current(participant).await?;
        let script = info.script(current.phase)?;
        if !matches(script, &user.handle(), text) {
            tracing::debug!(
                user_id = user.id,
                challenge_id = challenge.id,
                phase = current.phase,
                "incorrect story"
            );
            return Ok(CheckedResult::incorrect(current.phase));
        }
        tracing::info!(
            user_id = user.id,
            user = %user.full_name(),
            challenge_id = challenge.id,
            phase = current.phase,
            "correct story"
        );
        self.phases.advance(participant, challenge, &current).await
    }
}
