//! Reply composition.
//!
//! Pure functions from the quiz state and lifecycle outcomes to reply texts
//! and markup. Randomly chosen phrases are picked by the caller and passed
//! in, so every function here is deterministic.

use quizbot_core::response::{BotResponse, Markup};

use crate::domain::challenge_info::ChallengeType;
use crate::domain::settings::Messages;
use crate::domain::state::{Evaluation, EvaluationStatus, QuizState, StartOutcome};

/// Phrases picked for one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phrases {
    /// Small talk, from chitchat or a canned phrase.
    pub filler: String,
    pub correct: String,
    pub incorrect: String,
}

/// Composed reply, not yet addressed to a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub replies: Vec<String>,
    pub markup: Option<Markup>,
    pub split: bool,
}

impl Reply {
    fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            ..Self::default()
        }
    }

    fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = Some(markup);
        self
    }

    /// Addresses the reply to a chat.
    #[must_use]
    pub fn into_response(self, chat_id: i64, user_message: Option<String>) -> BotResponse {
        BotResponse {
            chat_id,
            user_message,
            replies: self.replies,
            markup: self.markup,
            split: self.split,
        }
    }
}

/// `/help`.
#[must_use]
pub fn help(messages: &Messages, state: QuizState) -> Reply {
    let greetings = messages.greetings.clone();
    match state {
        QuizState::InProgress => Reply::new(vec![greetings, messages.wait_for_user_info.clone()])
            .with_markup(Markup::Start),
        QuizState::Finished => Reply::new(vec![greetings, messages.post_end_info.clone()])
            .with_markup(Markup::Status),
        QuizState::New | QuizState::WaitNext => Reply::new(vec![greetings]),
    }
}

/// `/start`. `outcome` is the enrollment result while a challenge runs.
#[must_use]
pub fn start(messages: &Messages, state: QuizState, outcome: Option<StartOutcome>) -> Reply {
    match (state, outcome) {
        (QuizState::InProgress, Some(outcome)) => {
            Reply::new(outcome.into_replies()).with_markup(Markup::Status)
        }
        (QuizState::Finished, _) => {
            Reply::new(vec![messages.post_end_info.clone()]).with_markup(Markup::Status)
        }
        _ => Reply::new(vec![messages.not_started_info.clone()]),
    }
}

/// `/status`. `info` is the rendered challenge status, `None` before the
/// first challenge.
#[must_use]
pub fn status(messages: &Messages, info: Option<String>) -> Reply {
    match info {
        Some(info) => Reply::new(vec![info]).with_markup(Markup::Status),
        None => Reply::new(vec![messages.not_started_info.clone()]),
    }
}

fn expired(messages: &Messages, evaluation: Evaluation) -> Reply {
    let mut replies = evaluation.replies;
    match evaluation.quiz_state {
        QuizState::InProgress => {
            replies.push(messages.wait_for_user_info.clone());
            Reply::new(replies).with_markup(Markup::Start)
        }
        QuizState::Finished => {
            replies.push(messages.post_end_info.clone());
            Reply::new(replies)
        }
        QuizState::New | QuizState::WaitNext => Reply::new(replies),
    }
}

/// `/skip`.
#[must_use]
pub fn skip(messages: &Messages, evaluation: Evaluation) -> Reply {
    match evaluation.status {
        EvaluationStatus::Correct => {
            let mut replies = vec![messages.skip_question_success.clone()];
            replies.extend(evaluation.replies);
            Reply {
                replies,
                markup: None,
                split: true,
            }
        }
        EvaluationStatus::Expired => expired(messages, evaluation),
        EvaluationStatus::Incorrect | EvaluationStatus::NotChecked => {
            Reply::new(vec![messages.skip_question_prohibited.clone()])
        }
    }
}

/// Free text from a registered user. `challenge_type` is the type of the
/// running challenge, used to offer skipping.
#[must_use]
pub fn answer(
    messages: &Messages,
    evaluation: Evaluation,
    challenge_type: Option<ChallengeType>,
    phrases: Phrases,
) -> Reply {
    match evaluation.status {
        EvaluationStatus::Correct => {
            let mut replies = vec![phrases.correct];
            replies.extend(evaluation.replies);
            Reply {
                replies,
                markup: None,
                split: true,
            }
        }
        EvaluationStatus::Incorrect => {
            let reply = Reply::new(vec![phrases.filler, phrases.incorrect]);
            if challenge_type == Some(ChallengeType::Regular) {
                reply.with_markup(Markup::Skip)
            } else {
                reply
            }
        }
        EvaluationStatus::Expired => expired(messages, evaluation),
        EvaluationStatus::NotChecked => {
            if evaluation.quiz_state == QuizState::InProgress {
                Reply::new(vec![phrases.filler, messages.wait_for_user_info.clone()])
                    .with_markup(Markup::Start)
            } else {
                Reply::new(vec![phrases.filler])
            }
        }
    }
}

/// Free text from a registered user before the first challenge.
#[must_use]
pub fn idle(phrases: Phrases) -> Reply {
    Reply::new(vec![phrases.filler])
}

/// Free text from a user the bot has never seen.
#[must_use]
pub fn unknown_user(messages: &Messages, phrases: Phrases) -> Reply {
    Reply::new(vec![phrases.filler, messages.unknown_info.clone()]).with_markup(Markup::Help)
}
