mod agent;
mod checkpoint;
mod config;
mod intent;
mod platform;
mod poller;
mod reply;
mod resolvers;
mod scheduler;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::agent::Agent;
use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::platform::x::XClient;
use crate::platform::Platform;
use crate::poller::Poller;
use crate::resolvers::llm::LlmClient;
use crate::resolvers::news::NewsClient;
use crate::scheduler::Scheduler;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,xbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from the environment (and .env when present)
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  Poll interval: {:?}", config.poll_interval);
    info!("  Checkpoint: {}", config.checkpoint_path.display());
    info!("  Port: {}", config.port);

    let platform: Arc<dyn Platform> = Arc::new(XClient::new(config.x.clone()));
    let agent = Arc::new(Agent::new(
        NewsClient::new(config.news.clone()),
        LlmClient::new(config.answer.clone()),
    ));
    let checkpoint = Arc::new(CheckpointStore::new(config.checkpoint_path.clone()));

    // Resolve who we are once, up front. Replying as the wrong account or
    // failing the self-reply guard is worse than refusing to start.
    let mut identity = platform
        .bot_identity()
        .await
        .context("Failed to resolve bot identity")?;
    if let Some(handle) = &config.bot_handle {
        identity.handle = handle.clone();
    }
    info!("Running as @{} (id {})", identity.handle, identity.id);

    let poller = Arc::new(Poller::new(
        platform,
        agent.clone(),
        checkpoint,
        identity.clone(),
        config.poll_interval,
    ));

    // Background poll loop, independent of the request-serving surface
    let scheduler = Scheduler::new().await?;
    let poll_poller = poller.clone();
    scheduler
        .add_repeated_job(config.poll_interval, "poll-mentions", move || {
            let poller = poll_poller.clone();
            Box::pin(async move {
                if let Err(e) = poller.run_cycle().await {
                    error!("Poll cycle failed: {:#}", e);
                }
            })
        })
        .await?;
    scheduler.start().await?;

    info!("Bot is starting...");
    let state = Arc::new(AppState {
        identity,
        agent,
        poller,
    });
    server::serve(state, config.port).await?;

    Ok(())
}
