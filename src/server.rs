use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::agent::Agent;
use crate::platform::BotIdentity;
use crate::poller::{CycleSummary, Poller};

/// Shared state behind the web surface
pub struct AppState {
    pub identity: BotIdentity,
    pub agent: Arc<Agent>,
    pub poller: Arc<Poller>,
}

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
    handle: String,
    version: &'static str,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    /// `null` when the text would be ignored as a mention (not a question).
    answer: Option<String>,
}

async fn home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "xbot is running",
        handle: state.identity.handle.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run one poll cycle on demand. Serialized against the background loop by
/// the poller's own cycle lock.
async fn trigger(State(state): State<Arc<AppState>>) -> Result<Json<CycleSummary>, StatusCode> {
    match state.poller.run_cycle().await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            error!("Manually triggered cycle failed: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Run the classify → resolve → compose pipeline on an ad-hoc question
/// without posting anything.
async fn ask(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> Json<AskResponse> {
    let answer = state.agent.answer_question(&body.question).await;
    Json(AskResponse { answer })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/trigger", post(trigger))
        .route("/ask", post(ask))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Web surface listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
