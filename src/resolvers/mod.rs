pub mod llm;
pub mod news;

use serde::Deserialize;
use thiserror::Error;

/// A news headline, as much of it as the reply pipeline needs
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
}

/// Errors from the content resolvers. The pipeline degrades all of these to
/// user-facing fallback text; the kinds exist so tests and logs can tell a
/// timeout from a bad payload.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("request timed out")]
    Timeout,
    #[error("service returned status {0}")]
    Status(u16),
    #[error("unexpected payload: {0}")]
    Malformed(String),
    #[error("request failed: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ResolverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResolverError::Timeout
        } else {
            ResolverError::Network(err)
        }
    }
}
