//! Quiz configuration and reply templates.
//!
//! Templates use `{name}` placeholders filled by [`render`]. Every template
//! has an English default and can be overridden from the `messages` section
//! of the quiz configuration.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use quizbot_core::error::DomainError;
use serde::{Deserialize, Serialize};

use crate::domain::challenge_info::ChallengeInfo;
use crate::domain::state::{ActiveChallenge, WinnerResult};

const TIME_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

/// Replaces every `{key}` in `template` with its value.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |text, (key, value)| {
            text.replace(&format!("{{{key}}}"), value)
        })
}

/// Reply texts. Lists are picked from at random.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub greetings: String,
    pub unknown_info: String,
    pub not_started_info: String,
    pub wait_for_user_info: String,
    pub out_of_date_info: String,
    pub post_end_info: String,
    pub empty_messages: Vec<String>,
    pub correct_answer_notifications: Vec<String>,
    pub incorrect_answer_notifications: Vec<String>,
    pub skip_question_success: String,
    pub skip_question_prohibited: String,
    pub join_prompt: String,
    /// Placeholders: `number`, `name`, `description`.
    pub start_notification: String,
    /// Placeholders: `name`.
    pub already_started_notification: String,
    /// Placeholders: `name`, `position`, `scores`, `timestamp`, `timezone`.
    pub pretender_notification: String,
    /// Placeholders: `number`, `question`.
    pub next_answer_notification: String,
    /// Placeholders: `number`, `name`, `results`.
    pub challenge_info: String,
    /// Placeholders: `position`, `nick_name`, `scores`, `timestamp`.
    pub results_row: String,
    /// Placeholders: `minutes`.
    pub time_info: String,
    /// Placeholders: `timestamp`, `timezone`.
    pub time_over_info: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            greetings: "My name is Quiz Bot and I host this quiz. Commands:\n\
                        /start - join the current challenge;\n\
                        /status - show the current challenge;\n\
                        /skip - skip the current question;\n\
                        /help - show this message.\n\n\
                        You do not have to remember them, I will guide you along the way."
                .to_owned(),
            unknown_info: "If you want to know what kind of bot I am, press the help button."
                .to_owned(),
            not_started_info:
                "The next challenge has not started yet. Wait for the start announcement."
                    .to_owned(),
            wait_for_user_info: "Press start to begin your way to victory!".to_owned(),
            out_of_date_info: "Sorry, you are a little late. The challenge is over.".to_owned(),
            post_end_info: "The quiz is over, thanks for playing!".to_owned(),
            empty_messages: strings(&[
                "Nothing to say ¯\\_(ツ)_/¯",
                "Do you really think so?",
                "Maybe next time.",
                "Hmm...",
                "That is interesting.",
            ]),
            correct_answer_notifications: strings(&[
                "Correct.",
                "Well done!",
                "Keep it up!",
                "True indeed.",
            ]),
            incorrect_answer_notifications: strings(&[
                "But the answer is wrong.",
                "No, that is not the right answer.",
                "Missed it this time.",
                "Another try?",
                "Maybe in a parallel universe that would be right. Not in ours.",
            ]),
            skip_question_success: "Question skipped.".to_owned(),
            skip_question_prohibited: "There is no question to skip right now.".to_owned(),
            join_prompt: "Press start to join!".to_owned(),
            start_notification: "Challenge #{number} {name} begins for you! {description}"
                .to_owned(),
            already_started_notification: "You are already taking part in challenge {name}."
                .to_owned(),
            pretender_notification: "Congratulations! You finished '{name}' in place #{position} \
                                     with {scores} points. Finish time: {timestamp} ({timezone}). \
                                     Please wait for the challenge to end."
                .to_owned(),
            next_answer_notification: "Question #{number}: {question}".to_owned(),
            challenge_info: "Challenge #{number}: {name}\n\n{results}".to_owned(),
            results_row: "#{position}: @{nick_name} with {scores} points (finished at {timestamp})"
                .to_owned(),
            time_info: "{minutes} minutes left until the challenge ends.".to_owned(),
            time_over_info: "The challenge ended at {timestamp} ({timezone}).".to_owned(),
        }
    }
}

/// The whole quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Start the next challenge without an operator.
    #[serde(default)]
    pub autostart: bool,
    /// Offset used when showing times to users.
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Challenges in play order.
    pub challenges: Vec<ChallengeInfo>,
    /// Reply texts.
    #[serde(default)]
    pub messages: Messages,
}

impl QuizSettings {
    /// Parses and validates a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document is malformed or
    /// violates a configuration rule.
    pub fn from_yaml(yaml: &str) -> Result<Self, DomainError> {
        let settings: Self = serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::Validation(format!("invalid quiz configuration: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the configuration rules.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on an empty challenge list, a
    /// duplicate name, an invalid challenge or an invalid UTC offset.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.challenges.is_empty() {
            return Err(DomainError::Validation("no challenges configured".to_owned()));
        }
        let mut names = HashSet::new();
        for info in &self.challenges {
            info.validate()?;
            if !names.insert(info.name.as_str()) {
                return Err(DomainError::Validation(format!(
                    "duplicate challenge name '{}'",
                    info.name
                )));
            }
        }
        self.offset()?;
        Ok(())
    }

    fn offset(&self) -> Result<FixedOffset, DomainError> {
        FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600)).ok_or_else(|| {
            DomainError::Validation(format!("invalid utc offset {}", self.utc_offset_hours))
        })
    }

    /// Number of configured challenges.
    #[must_use]
    pub fn challenge_amount(&self) -> usize {
        self.challenges.len()
    }

    /// Configuration of the challenge at a 1-based position.
    #[must_use]
    pub fn challenge_at(&self, number: usize) -> Option<&ChallengeInfo> {
        number.checked_sub(1).and_then(|i| self.challenges.get(i))
    }

    /// 1-based position and configuration of the challenge named `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &ChallengeInfo)> {
        self.challenges
            .iter()
            .enumerate()
            .find(|(_, info)| info.name == name)
            .map(|(i, info)| (i + 1, info))
    }

    /// Label of the display timezone, e.g. `UTC+05:00`.
    #[must_use]
    pub fn timezone(&self) -> String {
        let offset = self.offset().unwrap_or_else(|_| Utc.fix());
        format!("UTC{offset}")
    }

    /// Formats a timestamp in the display timezone.
    #[must_use]
    pub fn display_time(&self, at: DateTime<Utc>) -> String {
        let offset = self.offset().unwrap_or_else(|_| Utc.fix());
        at.with_timezone(&offset).format(TIME_FORMAT).to_string()
    }

    /// Announcement for a user who just joined a challenge.
    #[must_use]
    pub fn start_notification(&self, number: usize, info: &ChallengeInfo) -> String {
        render(
            &self.messages.start_notification,
            &[
                ("number", &number.to_string()),
                ("name", &info.name),
                ("description", &info.description),
            ],
        )
    }

    /// Notice for a user already enrolled in the challenge.
    #[must_use]
    pub fn already_started_notification(&self, info: &ChallengeInfo) -> String {
        render(
            &self.messages.already_started_notification,
            &[("name", &info.name)],
        )
    }

    /// Prompt for a phase.
    #[must_use]
    pub fn next_answer_notification(&self, phase: u32, question: &str) -> String {
        render(
            &self.messages.next_answer_notification,
            &[("number", &phase.to_string()), ("question", question)],
        )
    }

    /// Notice for a participant that completed every phase.
    #[must_use]
    pub fn pretender_notification(&self, info: &ChallengeInfo, winner: &WinnerResult) -> String {
        render(
            &self.messages.pretender_notification,
            &[
                ("name", &info.name),
                ("position", &winner.position.to_string()),
                ("scores", &winner.scores.to_string()),
                ("timestamp", &self.display_time(winner.finished_at)),
                ("timezone", &self.timezone()),
            ],
        )
    }

    /// Status of a challenge: time left while it runs, the ranking once it
    /// is over.
    #[must_use]
    pub fn challenge_info(
        &self,
        active: &ActiveChallenge,
        winners: &[WinnerResult],
        now: DateTime<Utc>,
    ) -> String {
        let results = match active.challenge.finished_at {
            None => {
                let minutes = (active.finish_after(now).num_seconds() + 30).div_euclid(60);
                render(&self.messages.time_info, &[("minutes", &minutes.to_string())])
            }
            Some(finished_at) => {
                let rows: Vec<String> = winners
                    .iter()
                    .map(|winner| {
                        render(
                            &self.messages.results_row,
                            &[
                                ("position", &winner.position.to_string()),
                                ("nick_name", &winner.user.handle()),
                                ("scores", &winner.scores.to_string()),
                                ("timestamp", &self.display_time(winner.finished_at)),
                            ],
                        )
                    })
                    .collect();
                let over = render(
                    &self.messages.time_over_info,
                    &[
                        ("timestamp", &self.display_time(finished_at)),
                        ("timezone", &self.timezone()),
                    ],
                );
                if rows.is_empty() {
                    over
                } else {
                    format!("{}\n\n{over}", rows.join("\n"))
                }
            }
        };
        render(
            &self.messages.challenge_info,
            &[
                ("number", &active.number.to_string()),
                ("name", &active.info.name),
                ("results", &results),
            ],
        )
    }
}
