//! Host REST API
//!
//! Slash command registration and guild lookups, authenticated with the bot
//! token.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::commands::catalog::CommandSpec;

/// Errors from the host REST API.
#[derive(Error, Debug)]
pub enum HostError {
    /// Transport failure or unparsable body.
    #[error("Host request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("Host returned {status}: {body}")]
    Status {
        /// Returned status.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// Resolves guild ownership for permission checks.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// User ID of the guild's owner.
    async fn guild_owner(&self, guild_id: Uuid) -> Result<Uuid, HostError>;
}

#[derive(Debug, Deserialize)]
struct GuildResponse {
    owner_id: Uuid,
}

#[derive(Debug, serde::Serialize)]
struct RegisterCommandsRequest<'a> {
    commands: &'a [CommandSpec],
}

/// Client for the host REST API.
#[derive(Debug, Clone)]
pub struct HostClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl HostClient {
    pub fn new(http: reqwest::Client, base_url: &str, bot_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Replace the application's global commands with `commands`.
    #[instrument(skip(self, commands))]
    pub async fn register_commands(
        &self,
        application_id: Uuid,
        commands: &[CommandSpec],
    ) -> Result<(), HostError> {
        let response = self
            .http
            .put(format!(
                "{}/api/applications/{application_id}/commands",
                self.base_url
            ))
            .header(AUTHORIZATION, self.auth_header())
            .json(&RegisterCommandsRequest { commands })
            .send()
            .await?;

        check_status(response).await?;
        info!(count = commands.len(), "Slash commands registered");
        Ok(())
    }
}

#[async_trait]
impl GuildDirectory for HostClient {
    async fn guild_owner(&self, guild_id: Uuid) -> Result<Uuid, HostError> {
        let response = self
            .http
            .get(format!("{}/api/guilds/{guild_id}", self.base_url))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let guild: GuildResponse = check_status(response).await?.json().await?;
        Ok(guild.owner_id)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, HostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HostError::Status { status, body })
}
