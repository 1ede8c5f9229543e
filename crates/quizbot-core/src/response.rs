//! Outbound bot responses.

use serde::Serialize;

/// UI affordance attached to the last message of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    /// A single "Help" button.
    Help,
    /// A single "Start" button.
    Start,
    /// A single "Status" button.
    Status,
    /// A single "Skip" button.
    Skip,
    /// "Status" and "Start" in one row.
    StartWithStatus,
}

impl Markup {
    /// The commands behind the buttons, left to right.
    #[must_use]
    pub fn commands(self) -> &'static [&'static str] {
        match self {
            Self::Help => &["/help"],
            Self::Start => &["/start"],
            Self::Status => &["/status"],
            Self::Skip => &["/skip"],
            Self::StartWithStatus => &["/status", "/start"],
        }
    }
}

/// Replies addressed to one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotResponse {
    /// Destination chat.
    pub chat_id: i64,
    /// The inbound text this responds to, if any.
    pub user_message: Option<String>,
    /// Reply texts in order.
    pub replies: Vec<String>,
    /// Optional buttons.
    pub markup: Option<Markup>,
    /// Deliver each reply as its own message.
    pub split: bool,
}

/// A single message as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Destination chat.
    pub chat_id: i64,
    /// Message text.
    pub text: String,
    /// Optional buttons.
    pub markup: Option<Markup>,
}

impl BotResponse {
    /// Creates a response with a single reply.
    #[must_use]
    pub fn single(chat_id: i64, reply: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_message: None,
            replies: vec![reply.into()],
            markup: None,
            split: false,
        }
    }

    /// Groups replies into deliverable messages: one per reply when `split`,
    /// otherwise all replies joined by a space. The markup rides on the last
    /// message.
    #[must_use]
    pub fn messages(&self) -> Vec<OutboundMessage> {
        let texts = if self.split {
            self.replies.clone()
        } else if self.replies.is_empty() {
            Vec::new()
        } else {
            vec![self.replies.join(" ")]
        };
        let last = texts.len().saturating_sub(1);
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| OutboundMessage {
                chat_id: self.chat_id,
                text,
                markup: if index == last { self.markup } else { None },
            })
            .collect()
    }
}
