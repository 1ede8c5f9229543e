//! Server configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use quizbot_challenge::domain::settings::QuizSettings;
use quizbot_core::error::DomainError;
use thiserror::Error;

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },

    /// The quiz file cannot be read.
    #[error("cannot read quiz configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The quiz file is not a valid quiz.
    #[error(transparent)]
    Quiz(#[from] DomainError),
}

/// Settings of the remote chitchat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChitchatConfig {
    pub url: String,
    pub timeout: Duration,
    /// Replies containing any of these are discarded.
    pub filter_phrases: Vec<String>,
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub quiz_path: PathBuf,
    /// Overrides `autostart` from the quiz file.
    pub autostart: Option<bool>,
    pub chitchat: Option<ChitchatConfig>,
}

const DEFAULT_CHITCHAT_TIMEOUT_SECS: u64 = 3;

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` without `QUIZ_CONFIG` and
    /// `ConfigError::Invalid` for an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let quiz_path = lookup("QUIZ_CONFIG")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("QUIZ_CONFIG"))?;
        let port = match lookup("PORT") {
            Some(port) => parse("PORT", &port)?,
            None => 3000,
        };
        let autostart = lookup("QUIZ_AUTOSTART")
            .map(|value| parse("QUIZ_AUTOSTART", &value))
            .transpose()?;

        let chitchat = match lookup("CHITCHAT_URL") {
            Some(url) => {
                let secs = match lookup("CHITCHAT_TIMEOUT_SECS") {
                    Some(secs) => parse("CHITCHAT_TIMEOUT_SECS", &secs)?,
                    None => DEFAULT_CHITCHAT_TIMEOUT_SECS,
                };
                let filter_phrases = lookup("CHITCHAT_FILTER_PHRASES")
                    .map(|phrases| {
                        phrases
                            .split(',')
                            .map(str::trim)
                            .filter(|phrase| !phrase.is_empty())
                            .map(str::to_lowercase)
                            .collect()
                    })
                    .unwrap_or_default();
                Some(ChitchatConfig {
                    url,
                    timeout: Duration::from_secs(secs),
                    filter_phrases,
                })
            }
            None => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            quiz_path,
            autostart,
            chitchat,
        })
    }

    /// Loads the quiz file and applies the autostart override.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file is unreadable and
    /// `ConfigError::Quiz` if it is not a valid quiz.
    pub fn load_quiz(&self) -> Result<QuizSettings, ConfigError> {
        let yaml = std::fs::read_to_string(&self.quiz_path).map_err(|source| ConfigError::Read {
            path: self.quiz_path.clone(),
            source,
        })?;
        let mut settings = QuizSettings::from_yaml(&yaml)?;
        if let Some(autostart) = self.autostart {
            settings.autostart = autostart;
        }
        Ok(settings)
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_with_only_quiz_path() {
        let config = Config::from_lookup(lookup(&[("QUIZ_CONFIG", "quiz.yaml")])).unwrap();

        assert_eq!(config.quiz_path, PathBuf::from("quiz.yaml"));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.database_url, None);
        assert_eq!(config.autostart, None);
        assert_eq!(config.chitchat, None);
    }

    #[test]
    fn test_missing_quiz_path_is_an_error() {
        let result = Config::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("QUIZ_CONFIG"))));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::from_lookup(lookup(&[("QUIZ_CONFIG", "q"), ("PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }

    #[test]
    fn test_chitchat_settings() {
        let config = Config::from_lookup(lookup(&[
            ("QUIZ_CONFIG", "q"),
            ("QUIZ_AUTOSTART", "true"),
            ("CHITCHAT_URL", "http://chitchat:8000/reply"),
            ("CHITCHAT_FILTER_PHRASES", "Tip of the day, , ADVERT"),
        ]))
        .unwrap();

        assert_eq!(config.autostart, Some(true));
        let chitchat = config.chitchat.unwrap();
        assert_eq!(chitchat.timeout, Duration::from_secs(3));
        assert_eq!(chitchat.filter_phrases, vec!["tip of the day", "advert"]);
    }

    #[test]
    fn test_unreadable_quiz_file() {
        let config = Config::from_lookup(lookup(&[("QUIZ_CONFIG", "/nonexistent/quiz.yaml")]))
            .unwrap();

        assert!(matches!(config.load_quiz(), Err(ConfigError::Read { .. })));
    }
}
