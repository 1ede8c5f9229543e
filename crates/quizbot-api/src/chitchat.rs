//! HTTP client for the remote chitchat service.

use async_trait::async_trait;
use quizbot_challenge::application::chitchat::Chitchat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ChitchatConfig;

#[derive(Debug, Serialize)]
struct ChitchatRequest<'a> {
    text: &'a str,
    user_id: String,
    force_full_mode: bool,
}

#[derive(Debug, Deserialize)]
struct ChitchatResponse {
    text: String,
}

/// Asks the chitchat service for small talk.
#[derive(Debug, Clone)]
pub struct HttpChitchatClient {
    client: reqwest::Client,
    url: String,
    filter_phrases: Vec<String>,
}

impl HttpChitchatClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be initialized.
    pub fn new(config: &ChitchatConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            filter_phrases: config.filter_phrases.clone(),
        })
    }

    fn filtered(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.filter_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    async fn request(&self, session: Uuid, text: &str) -> Result<String, reqwest::Error> {
        let body = ChitchatRequest {
            text,
            user_id: session.to_string(),
            force_full_mode: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<ChitchatResponse>().await?.text)
    }
}

#[async_trait]
impl Chitchat for HttpChitchatClient {
    async fn reply(&self, session: Uuid, text: &str) -> Option<String> {
        match self.request(session, text).await {
            Ok(reply) if reply.trim().is_empty() || self.filtered(&reply) => {
                tracing::debug!(%session, "chitchat reply discarded");
                None
            }
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(%session, error = %e, "chitchat request failed");
                None
            }
        }
    }
}
