//! Command Dispatch
//!
//! Turns slash command invocations into workflow calls and replies. Enforces
//! the per-command constraints from [`catalog`]: guild-only, owner checks and
//! per-user cooldowns.

pub mod catalog;
mod cooldown;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::embeds::{curated_embed, search_menu, setup_embed, Reply};
use crate::gateway::rest::{GuildDirectory, HostError};
use crate::workflow::{ImageFetchWorkflow, WorkflowError};
use catalog::{Access, CommandOptionType, CommandSpec};
pub use cooldown::CommandCooldown;

/// Reply for faults the user cannot fix.
const UPSTREAM_FAILURE: &str = "Something went wrong fetching from Pexels.";

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command name not in the catalogue.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// Guild-only command used outside a guild.
    #[error("This command can only be used in a guild.")]
    GuildOnly,
    /// Caller is not the guild owner.
    #[error("Only the guild owner can use this command.")]
    NotGuildOwner,
    /// Caller is not a bot owner.
    #[error("Only the bot owner can use this command.")]
    NotBotOwner,
    /// Caller used the command too recently.
    #[error("This command is on cooldown. Try again in {retry_after}s.")]
    Cooldown {
        /// Seconds until the next accepted use.
        retry_after: u64,
    },
    /// Search without a term.
    #[error("Enter a search term.")]
    MissingTerm,
    /// Guild owner lookup failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// Workflow failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Workflow(e) if e.is_user_facing() => Self::Text(e.to_string()),
            CommandError::Workflow(e) => {
                error!(error = %e, "Pexels command failed");
                Self::Text(UPSTREAM_FAILURE.to_string())
            }
            CommandError::Host(e) => {
                error!(error = %e, "Guild owner lookup failed");
                Self::Text("Could not verify guild ownership. Try again later.".to_string())
            }
            other => Self::Text(other.to_string()),
        }
    }
}

/// A slash command invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Command name.
    pub command_name: String,
    /// Guild where the command was invoked (`None` for DMs).
    pub guild_id: Option<Uuid>,
    /// Channel where the command was invoked.
    pub channel_id: Uuid,
    /// User who invoked the command.
    pub user_id: Uuid,
    /// Command arguments, either `{"name": value}` or `[{"name", "value"}]`.
    pub options: Value,
}

impl Invocation {
    fn option(&self, name: &str) -> Option<&Value> {
        match &self.options {
            Value::Object(map) => map.get(name),
            Value::Array(items) => items
                .iter()
                .find(|o| o.get("name").and_then(Value::as_str) == Some(name))
                .and_then(|o| o.get("value")),
            _ => None,
        }
    }

    /// Non-blank string argument.
    #[must_use]
    pub fn string_option(&self, name: &str) -> Option<String> {
        self.option(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Integer argument; numeric strings are accepted.
    #[must_use]
    pub fn integer_option(&self, name: &str) -> Option<i64> {
        let value = self.option(name)?;
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    }
}

/// Routes invocations to the workflow.
pub struct Dispatcher {
    workflow: ImageFetchWorkflow,
    guilds: Arc<dyn GuildDirectory>,
    cooldown: CommandCooldown,
    owner_ids: Vec<Uuid>,
    embed_color: u32,
}

impl Dispatcher {
    pub fn new(workflow: ImageFetchWorkflow, guilds: Arc<dyn GuildDirectory>, config: &Config) -> Self {
        Self {
            workflow,
            guilds,
            cooldown: CommandCooldown::new(config.command_cooldown()),
            owner_ids: config.owner_ids.clone(),
            embed_color: config.embed_color,
        }
    }

    /// Run an invocation and produce the reply, including error replies.
    pub async fn dispatch(&self, invocation: &Invocation) -> Reply {
        match self.run(invocation).await {
            Ok(reply) => reply,
            Err(e) => e.into(),
        }
    }

    /// Drop expired cooldown entries.
    pub fn cleanup_cooldowns(&self) {
        self.cooldown.cleanup();
    }

    #[instrument(skip(self, invocation), fields(command = %invocation.command_name, user_id = %invocation.user_id))]
    async fn run(&self, invocation: &Invocation) -> Result<Reply, CommandError> {
        let spec = catalog::find(&invocation.command_name)
            .ok_or_else(|| CommandError::UnknownCommand(invocation.command_name.clone()))?;

        if spec.guild_only && invocation.guild_id.is_none() {
            return Err(CommandError::GuildOnly);
        }
        self.check_access(&spec, invocation).await?;
        if missing_required_string(&spec, invocation) {
            return Err(CommandError::MissingTerm);
        }
        if spec.cooldown {
            self.cooldown
                .check(spec.name, invocation.user_id)
                .map_err(|remaining| CommandError::Cooldown {
                    retry_after: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
                })?;
        }

        let color = self.embed_color;
        match spec.name {
            catalog::HELP => Ok(Reply::Text(catalog::help_text())),
            catalog::SETUP => Ok(Reply::Embed(setup_embed(color))),
            catalog::CURATED => {
                let guild_id = require_guild(invocation)?;
                let pick = self.workflow.fetch_curated(guild_id).await?;
                Ok(Reply::Embed(curated_embed(&pick, color)))
            }
            catalog::SEARCH => {
                let guild_id = require_guild(invocation)?;
                let term = invocation
                    .string_option(catalog::TERM_OPTION)
                    .ok_or(CommandError::MissingTerm)?;
                let urls = self.workflow.fetch_search(guild_id, &term).await?;
                if urls.is_empty() {
                    return Ok(Reply::Text(format!("No results found for {term}.")));
                }
                Ok(Reply::Menu(search_menu(&term, urls, color)))
            }
            catalog::NUMBER => {
                let guild_id = require_guild(invocation)?;
                let number = invocation.integer_option(catalog::NUMBER_OPTION);
                self.workflow.set_guild_page_size(guild_id, number).await?;
                Ok(Reply::Tick)
            }
            catalog::RESET => {
                let guild_id = require_guild(invocation)?;
                self.workflow.reset_guild_page_size(guild_id).await?;
                Ok(Reply::Tick)
            }
            catalog::DEFNUMBER => {
                let number = invocation.integer_option(catalog::NUMBER_OPTION);
                self.workflow.set_global_page_size(number).await?;
                Ok(Reply::Tick)
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn is_bot_owner(&self, user_id: Uuid) -> bool {
        self.owner_ids.contains(&user_id)
    }

    async fn check_access(&self, spec: &CommandSpec, invocation: &Invocation) -> Result<(), CommandError> {
        match spec.access {
            Access::Everyone => Ok(()),
            Access::BotOwner if self.is_bot_owner(invocation.user_id) => Ok(()),
            Access::BotOwner => {
                warn!(user_id = %invocation.user_id, command = spec.name, "Bot owner command refused");
                Err(CommandError::NotBotOwner)
            }
            Access::GuildOwner if self.is_bot_owner(invocation.user_id) => Ok(()),
            Access::GuildOwner => {
                let guild_id = require_guild(invocation)?;
                let owner_id = self.guilds.guild_owner(guild_id).await?;
                if owner_id == invocation.user_id {
                    Ok(())
                } else {
                    Err(CommandError::NotGuildOwner)
                }
            }
        }
    }
}

fn missing_required_string(spec: &CommandSpec, invocation: &Invocation) -> bool {
    spec.options.iter().any(|o| {
        o.required
            && o.option_type == CommandOptionType::String
            && invocation.string_option(o.name).is_none()
    })
}

fn require_guild(invocation: &Invocation) -> Result<Uuid, CommandError> {
    invocation.guild_id.ok_or(CommandError::GuildOnly)
}
