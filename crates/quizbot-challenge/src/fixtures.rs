//! Shared test fixtures: a three-challenge quiz and an in-memory harness.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use quizbot_core::clock::Clock;
use quizbot_core::models::{User, UserProfile};
use quizbot_core::storage::{Storage, UserStorage};
use quizbot_store::memory::InMemoryStorage;
use quizbot_test_support::ManualClock;

use crate::application::lifecycle::ChallengeManager;
use crate::domain::challenge_info::{
    AnswerVariants, ChallengeInfo, ChallengeKind, StoryItem, StoryPhase,
};
use crate::domain::settings::{Messages, QuizSettings};

/// A story answer accepted for user `user1`.
pub(crate) const TALE_ANSWER: &str = "First we went to the forest\nFinally the wolf met user1";

pub(crate) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn one(answer: &str) -> AnswerVariants {
    AnswerVariants::One(answer.to_owned())
}

/// `arithmetic` (regular, 2 phases, 1 winner), `colors` (regular, 1 phase,
/// 2 winners) and `tale` (story, 1 phase, 1 winner).
pub(crate) fn settings(autostart: bool) -> QuizSettings {
    QuizSettings {
        autostart,
        utc_offset_hours: 0,
        challenges: vec![
            ChallengeInfo {
                name: "arithmetic".to_owned(),
                description: "Count and look up.".to_owned(),
                duration_secs: 3600,
                max_winners: 1,
                kind: ChallengeKind::Regular {
                    questions: vec!["2+2?".to_owned(), "Sky color?".to_owned()],
                    answers: vec![one("4"), one("blue")],
                },
            },
            ChallengeInfo {
                name: "colors".to_owned(),
                description: "Name the color.".to_owned(),
                duration_secs: 3600,
                max_winners: 2,
                kind: ChallengeKind::Regular {
                    questions: vec!["Color of grass?".to_owned()],
                    answers: vec![AnswerVariants::Many(vec![
                        "green".to_owned(),
                        "зелёный".to_owned(),
                    ])],
                },
            },
            ChallengeInfo {
                name: "tale".to_owned(),
                description: "Tell the story.".to_owned(),
                duration_secs: 3600,
                max_winners: 1,
                kind: ChallengeKind::Story {
                    phases: vec![StoryPhase {
                        question: "How did it go?".to_owned(),
                        script: vec![
                            StoryItem {
                                step: "first".to_owned(),
                                prepositions: vec!["initially".to_owned()],
                                construction: "went to".to_owned(),
                                text: "the forest".to_owned(),
                            },
                            StoryItem {
                                step: "finally".to_owned(),
                                prepositions: Vec::new(),
                                construction: "met".to_owned(),
                                text: "{username}".to_owned(),
                            },
                        ],
                    }],
                },
            },
        ],
        messages: Messages::default(),
    }
}

pub(crate) fn profile(external_id: i64) -> UserProfile {
    UserProfile {
        external_id,
        chat_id: external_id * 100,
        nick_name: Some(format!("user{external_id}")),
        first_name: Some(format!("User {external_id}")),
        last_name: None,
    }
}

/// In-memory storage and a manual clock starting at [`start_time`].
pub(crate) struct Harness {
    pub(crate) storage: Arc<InMemoryStorage>,
    pub(crate) clock: Arc<ManualClock>,
    settings: Arc<QuizSettings>,
}

impl Harness {
    pub(crate) fn new(settings: QuizSettings) -> Self {
        Self {
            storage: Arc::new(InMemoryStorage::new()),
            clock: Arc::new(ManualClock::new(start_time())),
            settings: Arc::new(settings),
        }
    }

    pub(crate) fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn manager(&self) -> ChallengeManager {
        ChallengeManager::new(Arc::clone(&self.settings), self.storage(), self.clock())
    }

    pub(crate) async fn user(&self, external_id: i64) -> User {
        self.storage
            .get_or_create_user(&profile(external_id))
            .await
            .unwrap()
    }
}
