//! Game-state endpoint client.
//! One read (`GET /api/game`) and four mutations, all plain JSON over HTTP.
//! No retries: a failed poll is simply replaced by the next one.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::model::{GameState, MutationResponse, SetupRequest};

const GAME_PATH: &str = "/api/game";
const SETUP_PATH: &str = "/api/game/setup";
const START_PATH: &str = "/api/game/start";
const END_PATH: &str = "/api/game/end";
const REFRESH_PATH: &str = "/api/game/refresh";

/// Why a mutation did not go through.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The server answered and reported failure.
    #[error("{0}")]
    Rejected(String),
    /// The request itself failed (connection, timeout, undecodable body).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl MutationError {
    /// Alert text, e.g. "Error: board size missing" or "Error starting game: ...".
    pub fn alert_text(&self, action: &str) -> String {
        match self {
            MutationError::Rejected(reason) => format!("Error: {}", reason),
            MutationError::Transport(e) => format!("Error {}: {}", action, e),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current snapshot, or `None` when the server has no game.
    pub async fn fetch_game_state(&self) -> Result<Option<GameState>> {
        let response = self
            .client
            .get(self.url(GAME_PATH))
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to request game state")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Game state request failed {}: {}", status, body);
        }

        let state: Option<GameState> = response
            .json()
            .await
            .context("Failed to parse game state")?;

        if let Some(state) = &state {
            state.validate().context("Server sent an inconsistent game state")?;
            debug!(game = ?state.id, status = %state.status, ended_at = ?state.ended_at, "fetched game state");
        }
        Ok(state)
    }

    pub async fn setup_game(&self, request: &SetupRequest) -> Result<(), MutationError> {
        self.mutate(SETUP_PATH, Some(request)).await
    }

    pub async fn start_game(&self) -> Result<(), MutationError> {
        self.mutate::<()>(START_PATH, None).await
    }

    pub async fn end_game(&self) -> Result<(), MutationError> {
        self.mutate::<()>(END_PATH, None).await
    }

    /// Asks the server to re-check submissions. The reply carries nothing useful.
    pub async fn refresh(&self) -> Result<()> {
        self.post(REFRESH_PATH, None::<&()>)
            .await
            .context("Failed to request refresh")?;
        Ok(())
    }

    async fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> reqwest::Result<reqwest::Response> {
        let mut request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    // Rejections come back as 400 with a JSON body, so the status code is not checked.
    async fn mutate<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<(), MutationError> {
        let reply: MutationResponse = self.post(path, body).await?.json().await?;
        debug!(path, success = reply.success, "mutation reply");
        interpret(reply)
    }
}

fn interpret(reply: MutationResponse) -> Result<(), MutationError> {
    if reply.success {
        return Ok(());
    }
    Err(MutationError::Rejected(
        reply.error.unwrap_or_else(|| "request was rejected".to_string()),
    ))
}
