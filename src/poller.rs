use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::agent::Agent;
use crate::checkpoint::CheckpointStore;
use crate::intent::{classify, clean_mention_text};
use crate::platform::{BotIdentity, Mention, Platform, PlatformError};
use crate::reply::compose_reply;

/// What one poll cycle did; returned to `/trigger` callers and logged.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CycleSummary {
    pub fetched: usize,
    pub replied: usize,
    pub skipped: usize,
}

enum Outcome {
    Replied,
    Skipped,
}

/// Drives the mention pipeline: fetch everything past the checkpoint,
/// process oldest-first, advance the checkpoint one mention at a time.
pub struct Poller {
    platform: Arc<dyn Platform>,
    agent: Arc<Agent>,
    checkpoint: Arc<CheckpointStore>,
    identity: BotIdentity,
    poll_interval: Duration,
    /// Serializes the scheduled loop against manual `/trigger` calls.
    cycle_lock: Mutex<()>,
    /// Set after a rate-limited fetch; cycles inside the window are skipped.
    backoff_until: Mutex<Option<Instant>>,
}

impl Poller {
    pub fn new(
        platform: Arc<dyn Platform>,
        agent: Arc<Agent>,
        checkpoint: Arc<CheckpointStore>,
        identity: BotIdentity,
        poll_interval: Duration,
    ) -> Self {
        Self {
            platform,
            agent,
            checkpoint,
            identity,
            poll_interval,
            cycle_lock: Mutex::new(()),
            backoff_until: Mutex::new(None),
        }
    }

    /// Run one poll cycle. A fetch failure aborts the whole cycle with the
    /// checkpoint untouched; per-mention failures never do.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        let _guard = self.cycle_lock.lock().await;

        {
            let backoff = self.backoff_until.lock().await;
            if let Some(until) = *backoff {
                if Instant::now() < until {
                    info!("Still backing off after a rate limit, skipping this cycle");
                    return Ok(CycleSummary::default());
                }
            }
        }

        let checkpoint = self.checkpoint.load().await;
        debug!("Poll cycle starting, checkpoint: {:?}", checkpoint);

        let mut mentions = match self.platform.get_mentions_since(checkpoint).await {
            Ok(mentions) => mentions,
            Err(PlatformError::RateLimited) => {
                warn!("Mention fetch rate limited, backing off");
                *self.backoff_until.lock().await = Some(Instant::now() + 2 * self.poll_interval);
                return Ok(CycleSummary::default());
            }
            Err(e) => {
                // Checkpoint untouched; the next interval retries the same window.
                return Err(e).context("Failed to fetch mentions");
            }
        };
        *self.backoff_until.lock().await = None;

        // Oldest first. Processing order and the checkpoint invariant both
        // hang on this sort.
        mentions.sort_by_key(|m| m.id);

        let mut summary = CycleSummary {
            fetched: mentions.len(),
            ..CycleSummary::default()
        };

        for mention in mentions {
            let id = mention.id;
            match self.process_mention(mention).await {
                Outcome::Replied => summary.replied += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
            // Advance past the mention whether or not it was replied to, so
            // a persistently failing mention cannot block the queue. A lost
            // write only risks bounded reprocessing after a restart.
            if let Err(e) = self.checkpoint.save(id).await {
                error!("Failed to persist checkpoint {}: {:#}", id, e);
            }
        }

        if summary.fetched > 0 {
            info!(
                "Cycle done: {} fetched, {} replied, {} skipped",
                summary.fetched, summary.replied, summary.skipped
            );
        }
        Ok(summary)
    }

    async fn process_mention(&self, mention: Mention) -> Outcome {
        if mention.author_id == self.identity.id {
            debug!("Skipping self-authored mention {}", mention.id);
            return Outcome::Skipped;
        }

        // Resolve who to address before spending resolver calls on content.
        let handle = if mention.author_handle.is_empty() {
            match self.platform.resolve_handle(&mention.author_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(
                        "Could not resolve handle for author {} of mention {}: {}",
                        mention.author_id, mention.id, e
                    );
                    return Outcome::Skipped;
                }
            }
        } else {
            mention.author_handle.clone()
        };

        let cleaned = clean_mention_text(&mention.text, &self.identity.handle);
        let intent = classify(&cleaned);

        let Some(content) = self.agent.resolve(&intent).await else {
            debug!("Mention {} is not a question, ignoring", mention.id);
            return Outcome::Skipped;
        };

        let reply = compose_reply(&handle, &content);
        match self.platform.post_reply(&reply, mention.id).await {
            Ok(()) => {
                info!("Replied to mention {} from @{}", mention.id, handle);
                Outcome::Replied
            }
            Err(PlatformError::RateLimited) => {
                warn!("Rate limited posting reply to mention {}, dropping it", mention.id);
                Outcome::Skipped
            }
            Err(e @ PlatformError::Auth(_)) => {
                error!("Posting reply to mention {} failed: {}", mention.id, e);
                Outcome::Skipped
            }
            Err(e) => {
                warn!("Failed to post reply to mention {}: {}", mention.id, e);
                Outcome::Skipped
            }
        }
    }
}
