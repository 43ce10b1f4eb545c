//! Slash command catalogue.
//!
//! Names, descriptions and options registered with the host, plus the
//! invocation constraints each command carries.

use serde::Serialize;

/// Command option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOptionType {
    /// String input.
    String,
    /// Integer input.
    Integer,
}

/// Command option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOption {
    /// Option name.
    pub name: &'static str,
    /// Option description.
    pub description: &'static str,
    /// Option type.
    #[serde(rename = "type")]
    pub option_type: CommandOptionType,
    /// Whether this option is required.
    pub required: bool,
}

/// Who may invoke a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Everyone,
    /// The owner of the guild the command runs in (or a bot owner).
    GuildOwner,
    /// A bot owner.
    BotOwner,
}

/// A registrable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Command name.
    pub name: &'static str,
    /// Command description.
    pub description: &'static str,
    /// Command options/parameters.
    pub options: Vec<CommandOption>,
    #[serde(skip)]
    pub access: Access,
    #[serde(skip)]
    pub guild_only: bool,
    #[serde(skip)]
    pub cooldown: bool,
}

pub const HELP: &str = "pexels";
pub const SETUP: &str = "pexels-setup";
pub const CURATED: &str = "pexels-curated";
pub const SEARCH: &str = "pexels-search";
pub const NUMBER: &str = "pexels-number";
pub const RESET: &str = "pexels-reset";
pub const DEFNUMBER: &str = "pexels-defnumber";

/// Option name for the search term.
pub const TERM_OPTION: &str = "term";

/// Option name for page size arguments.
pub const NUMBER_OPTION: &str = "number";

fn number_option(description: &'static str) -> CommandOption {
    CommandOption {
        name: NUMBER_OPTION,
        description,
        option_type: CommandOptionType::Integer,
        required: true,
    }
}

/// All commands, in help order.
#[must_use]
pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: HELP,
            description: "Options for the Pexels bot",
            options: Vec::new(),
            access: Access::Everyone,
            guild_only: false,
            cooldown: false,
        },
        CommandSpec {
            name: SETUP,
            description: "How do I set up the bot? Check here.",
            options: Vec::new(),
            access: Access::BotOwner,
            guild_only: false,
            cooldown: false,
        },
        CommandSpec {
            name: CURATED,
            description: "Send you a random image from pexels.com",
            options: Vec::new(),
            access: Access::Everyone,
            guild_only: true,
            cooldown: true,
        },
        CommandSpec {
            name: SEARCH,
            description: "Search for a picture on Pexels. Limited to 10 due to 200 request limit on Pexels API.",
            options: vec![CommandOption {
                name: TERM_OPTION,
                description: "What to search for",
                option_type: CommandOptionType::String,
                required: true,
            }],
            access: Access::Everyone,
            guild_only: true,
            cooldown: true,
        },
        CommandSpec {
            name: NUMBER,
            description: "Set the number of photos to be fetched from Pexels",
            options: vec![number_option("Photos per request (15-80)")],
            access: Access::GuildOwner,
            guild_only: true,
            cooldown: false,
        },
        CommandSpec {
            name: RESET,
            description: "Resets the guild config of per page results.",
            options: Vec::new(),
            access: Access::GuildOwner,
            guild_only: true,
            cooldown: false,
        },
        CommandSpec {
            name: DEFNUMBER,
            description: "Set the default number of photos to be fetched from Pexels",
            options: vec![number_option("Default photos per request (15-80)")],
            access: Access::BotOwner,
            guild_only: false,
            cooldown: false,
        },
    ]
}

/// Look up a command by name.
#[must_use]
pub fn find(name: &str) -> Option<CommandSpec> {
    commands().into_iter().find(|c| c.name == name)
}

/// Help text listing every command.
#[must_use]
pub fn help_text() -> String {
    let mut text = String::from("Options for the Pexels bot\n\n");
    for cmd in commands().iter().filter(|c| c.name != HELP) {
        text.push_str(&format!("/{}: {}\n", cmd.name, cmd.description));
    }
    text.push_str(&format!(
        "\nVersion: {}\nAuthor: {}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    ));
    text
}
