//! Substring matching for question/answer challenges.

use async_trait::async_trait;
use quizbot_core::error::DomainError;
use quizbot_core::models::{Challenge, Participant, User};

use super::{AnswerChecker, PhaseTracker};
use crate::domain::challenge_info::{ChallengeInfo, ChallengeType};
use crate::domain::state::CheckedResult;

/// Trims, lowercases and folds `ё` into `е`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('ё', "е")
}

/// Whether any accepted answer occurs inside `answer`.
fn matches(expectations: &[String], answer: &str) -> bool {
    let answer = normalize(answer);
    expectations
        .iter()
        .map(|expected| normalize(expected))
        .any(|expected| !expected.is_empty() && answer.contains(&expected))
}

/// Checker for `ChallengeType::Regular`.
pub struct RegularChecker {
    phases: PhaseTracker,
}

impl RegularChecker {
    #[must_use]
    pub fn new(phases: PhaseTracker) -> Self {
        Self { phases }
    }
}

#[async_trait]
impl AnswerChecker for RegularChecker {
    fn challenge_type(&self) -> ChallengeType {
        ChallengeType::Regular
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
        let expectations = info.answer_variants(current.phase)?;
        if !matches(expectations.variants(), text) {
            tracing::debug!(
                user_id = user.id,
                challenge_id = challenge.id,
                phase = current.phase,
                "incorrect answer"
            );
            return Ok(CheckedResult::incorrect(current.phase));
        }
        tracing::info!(
            user_id = user.id,
            user = %user.full_name(),
            challenge_id = challenge.id,
            phase = current.phase,
            "correct answer"
        );
        self.phases.advance(participant, challenge, &current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_expected_answer_inside_user_text_matches() {
        assert!(matches(&answers(&["Paris"]), "I think it's PARIS!"));
    }

    #[test]
    fn test_fragment_of_expected_answer_does_not_match() {
        assert!(!matches(&answers(&["Paris"]), "par"));
    }

    #[test]
    fn test_any_variant_matches() {
        let expected = answers(&["blue", "azure"]);
        assert!(matches(&expected, "  Azure  "));
        assert!(!matches(&expected, "red"));
    }

    #[test]
    fn test_yo_is_folded_into_ye() {
        assert!(matches(&answers(&["зелёный"]), "Зеленый"));
        assert!(matches(&answers(&["зеленый"]), "ЗЕЛЁНЫЙ"));
    }

    #[test]
    fn test_blank_expectation_never_matches() {
        assert!(!matches(&answers(&["   "]), "anything"));
    }
}
