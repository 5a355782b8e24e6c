use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::XConfig;
use crate::platform::{BotIdentity, Mention, MentionId, Platform, PlatformError};

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
struct Includes {
    #[serde(default)]
    users: Vec<UserData>,
}

#[derive(Debug, Deserialize)]
struct MentionsResponse {
    // Absent entirely when there are no new mentions.
    #[serde(default)]
    data: Vec<TweetData>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Serialize)]
struct PostTweetRequest {
    text: String,
    reply: ReplyTarget,
}

#[derive(Debug, Serialize)]
struct ReplyTarget {
    in_reply_to_tweet_id: String,
}

/// X API v2 client. All calls carry the OAuth2 bearer token and share one
/// bounded-timeout reqwest client.
pub struct XClient {
    client: reqwest::Client,
    config: XConfig,
    /// Bot user id, resolved once from `/2/users/me` and reused by the
    /// mentions endpoint.
    user_id: tokio::sync::OnceCell<String>,
}

impl XClient {
    pub fn new(config: XConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            config,
            user_id: tokio::sync::OnceCell::new(),
        }
    }

    async fn fetch_me(&self) -> Result<UserData, PlatformError> {
        let url = format!("{}/2/users/me", self.config.base_url);
        let response = self.auth(self.client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Malformed(e.to_string()))?;
        Ok(user.data)
    }

    async fn bot_user_id(&self) -> Result<&str, PlatformError> {
        self.user_id
            .get_or_try_init(|| async { self.fetch_me().await.map(|u| u.id) })
            .await
            .map(String::as_str)
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(
            "Authorization",
            format!("Bearer {}", self.config.access_token),
        )
    }

    /// Map non-success statuses into the error taxonomy the poller matches on.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status.as_u16() {
            429 => Err(PlatformError::RateLimited),
            401 | 403 => Err(PlatformError::Auth(status.as_u16())),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(PlatformError::Api { status: code, body })
            }
        }
    }
}

#[async_trait]
impl Platform for XClient {
    async fn bot_identity(&self) -> Result<BotIdentity, PlatformError> {
        let user = self.fetch_me().await?;
        let _ = self.user_id.set(user.id.clone());
        Ok(BotIdentity {
            id: user.id,
            handle: user.username,
        })
    }

    async fn get_mentions_since(
        &self,
        since: Option<MentionId>,
    ) -> Result<Vec<Mention>, PlatformError> {
        let user_id = self.bot_user_id().await?;
        let url = format!("{}/2/users/{}/mentions", self.config.base_url, user_id);

        let mut query: Vec<(&str, String)> = vec![
            ("max_results", "100".to_string()),
            ("expansions", "author_id".to_string()),
            ("tweet.fields", "author_id,created_at".to_string()),
            ("user.fields", "username".to_string()),
        ];
        if let Some(id) = since {
            query.push(("since_id", id.to_string()));
        }

        debug!("Fetching mentions since {:?}", since);

        let response = self.auth(self.client.get(&url)).query(&query).send().await?;
        let response = Self::check_status(response).await?;
        let payload: MentionsResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Malformed(e.to_string()))?;

        let handles: HashMap<String, String> = payload
            .includes
            .users
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let mentions = payload
            .data
            .into_iter()
            .filter_map(|tweet| {
                let id: MentionId = match tweet.id.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        warn!("Dropping mention with non-numeric id: {}", tweet.id);
                        return None;
                    }
                };
                let author_id = tweet.author_id.unwrap_or_default();
                let author_handle = handles.get(&author_id).cloned().unwrap_or_default();
                Some(Mention {
                    id,
                    author_id,
                    author_handle,
                    text: tweet.text,
                    created_at: tweet.created_at,
                })
            })
            .collect();

        Ok(mentions)
    }

    async fn post_reply(&self, text: &str, in_reply_to: MentionId) -> Result<(), PlatformError> {
        let url = format!("{}/2/tweets", self.config.base_url);
        let request = PostTweetRequest {
            text: text.to_string(),
            reply: ReplyTarget {
                in_reply_to_tweet_id: in_reply_to.to_string(),
            },
        };

        debug!("Posting reply to mention {}", in_reply_to);

        let response = self.auth(self.client.post(&url)).json(&request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn resolve_handle(&self, user_id: &str) -> Result<String, PlatformError> {
        let url = format!("{}/2/users/{}", self.config.base_url, user_id);
        let response = self.auth(self.client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Malformed(e.to_string()))?;
        Ok(user.data.username)
    }
}
