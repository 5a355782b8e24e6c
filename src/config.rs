use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// X API credentials and endpoint
#[derive(Debug, Clone)]
pub struct XConfig {
    pub base_url: String,
    pub access_token: String,
}

/// NewsAPI credentials and endpoint
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Generative answer backend endpoint
#[derive(Debug, Clone)]
pub struct AnswerConfig {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub x: XConfig,
    pub news: NewsConfig,
    pub answer: AnswerConfig,
    /// Overrides the platform-reported handle when set.
    pub bot_handle: Option<String>,
    pub poll_interval: Duration,
    pub checkpoint_path: PathBuf,
    pub port: u16,
}

fn default_x_base_url() -> String {
    "https://api.x.com".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_poll_interval_secs() -> u64 {
    45
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("last_mention_id.txt")
}

fn default_port() -> u16 {
    8000
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("Missing environment variable: {}", name))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Build the configuration from the environment. Missing required
    /// credentials are a startup-fatal error naming the variable.
    pub fn from_env() -> Result<Self> {
        let poll_interval_secs = match optional("POLL_INTERVAL_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("POLL_INTERVAL_SECS is not a number: {}", v))?,
            None => default_poll_interval_secs(),
        };

        let port = match optional("PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", v))?,
            None => default_port(),
        };

        Ok(Config {
            x: XConfig {
                base_url: optional("X_API_BASE_URL").unwrap_or_else(default_x_base_url),
                access_token: required("X_ACCESS_TOKEN")?,
            },
            news: NewsConfig {
                base_url: optional("NEWS_API_BASE_URL").unwrap_or_else(default_news_base_url),
                api_key: required("NEWS_API_KEY")?,
            },
            answer: AnswerConfig {
                url: required("ANSWER_API_URL")?,
                api_key: optional("ANSWER_API_KEY"),
            },
            bot_handle: optional("BOT_HANDLE"),
            poll_interval: Duration::from_secs(poll_interval_secs),
            checkpoint_path: optional("CHECKPOINT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_checkpoint_path),
            port,
        })
    }
}
