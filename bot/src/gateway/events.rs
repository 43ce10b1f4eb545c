//! Bot gateway wire events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::Invocation;
use crate::embeds::{Embed, Menu, Reply};

/// Events that the server sends to the bot.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotServerEvent {
    /// A slash command was invoked.
    CommandInvoked {
        /// Unique interaction ID for this invocation.
        interaction_id: Uuid,
        /// Command name.
        command_name: String,
        /// Guild where command was invoked (null for DM commands).
        guild_id: Option<Uuid>,
        /// Channel where command was invoked.
        channel_id: Uuid,
        /// User who invoked the command.
        user_id: Uuid,
        /// Command options/arguments.
        #[serde(default)]
        options: serde_json::Value,
    },
    /// A message was created in a channel the bot has access to.
    MessageCreated {
        /// Message ID.
        message_id: Uuid,
        /// Channel ID.
        channel_id: Uuid,
    },
    /// Bot was added to a guild.
    GuildJoined {
        /// Guild ID.
        guild_id: Uuid,
        /// Guild name.
        guild_name: String,
    },
    /// Bot was removed from a guild.
    GuildLeft {
        /// Guild ID.
        guild_id: Uuid,
    },
    /// Error occurred.
    Error {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
    },
}

/// Events that the bot sends to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotClientEvent {
    /// Respond to a slash command invocation.
    CommandResponse {
        /// Interaction ID (from `CommandInvoked` event).
        interaction_id: Uuid,
        /// Response content.
        content: String,
        /// Whether the response is ephemeral (only visible to invoker).
        ephemeral: bool,
        /// Embeds to render with the response.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        embeds: Vec<Embed>,
        /// Paginated menu to render instead of a single message.
        #[serde(skip_serializing_if = "Option::is_none")]
        menu: Option<Menu>,
    },
}

/// Acknowledgement shown for successful settings changes.
const TICK: &str = "\u{2705}";

impl BotClientEvent {
    /// Wrap a command reply for the invocation it answers.
    #[must_use]
    pub fn response(interaction_id: Uuid, reply: Reply) -> Self {
        let (content, embeds, menu) = match reply {
            Reply::Text(text) => (text, Vec::new(), None),
            Reply::Embed(embed) => (String::new(), vec![embed], None),
            Reply::Menu(menu) => {
                // First page doubles as the fallback for hosts without menus.
                let first: Vec<Embed> = menu.pages.first().cloned().into_iter().collect();
                (String::new(), first, Some(menu))
            }
            Reply::Tick => (TICK.to_string(), Vec::new(), None),
        };
        Self::CommandResponse {
            interaction_id,
            content,
            ephemeral: false,
            embeds,
            menu,
        }
    }
}

impl BotServerEvent {
    /// Split a `CommandInvoked` event into its interaction ID and invocation.
    #[must_use]
    pub fn into_invocation(self) -> Option<(Uuid, Invocation)> {
        match self {
            Self::CommandInvoked {
                interaction_id,
                command_name,
                guild_id,
                channel_id,
                user_id,
                options,
            } => Some((
                interaction_id,
                Invocation {
                    command_name,
                    guild_id,
                    channel_id,
                    user_id,
                    options,
                },
            )),
            _ => None,
        }
    }
}
