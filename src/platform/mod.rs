pub mod x;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Platform-assigned mention id. Monotonically increasing, so it doubles as
/// the ordering key and the checkpoint boundary.
pub type MentionId = u64;

/// One inbound mention of the bot's handle
#[derive(Debug, Clone)]
pub struct Mention {
    pub id: MentionId,
    /// Platform-specific author id as string
    pub author_id: String,
    /// Author handle without the leading `@`. Empty when the fetch payload
    /// omitted the user expansion; resolved lazily via `resolve_handle`.
    pub author_handle: String,
    /// Raw mention text, still containing the bot's handle
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// The bot's own account, fetched once at startup
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: String,
    pub handle: String,
}

/// Errors from the social platform, split by how the poller reacts:
/// rate limits abort the fetch and arm a backoff, auth failures are loud,
/// everything else is logged and skipped.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("rate limited by platform")]
    RateLimited,
    #[error("authentication rejected (status {0})")]
    Auth(u16),
    #[error("platform API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Malformed(String),
}

/// Remote calls the poller depends on. The production implementation is
/// [`x::XClient`]; tests use an in-memory fake.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The authenticated bot account (id + handle).
    async fn bot_identity(&self) -> Result<BotIdentity, PlatformError>;

    /// Mentions with id greater than `since`, or all available history when
    /// `since` is `None`. Order is not guaranteed; callers sort by id.
    async fn get_mentions_since(
        &self,
        since: Option<MentionId>,
    ) -> Result<Vec<Mention>, PlatformError>;

    /// Post `text` as a threaded reply to the given mention.
    async fn post_reply(&self, text: &str, in_reply_to: MentionId) -> Result<(), PlatformError>;

    /// Look up the handle for a user id.
    async fn resolve_handle(&self, user_id: &str) -> Result<String, PlatformError>;
}
