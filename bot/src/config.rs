//! Bot Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot gateway WebSocket URL (e.g., "ws://localhost:8080/api/gateway/bot")
    pub gateway_url: String,

    /// Host REST API base URL (e.g., "http://localhost:8080")
    pub api_url: String,

    /// Bot token issued by the host for this application
    pub bot_token: String,

    /// Bot application ID, used to register slash commands (optional)
    pub application_id: Option<Uuid>,

    /// Users allowed to run bot-owner commands (comma-separated)
    pub owner_ids: Vec<Uuid>,

    /// Redis connection URL. When unset, settings live in memory only.
    pub redis_url: Option<String>,

    /// Prefix for Redis keys (default: "pexels")
    pub redis_key_prefix: String,

    /// Pexels API base URL
    pub pexels_api_url: String,

    /// Pexels API key used to seed the in-memory credential store (optional)
    pub pexels_api_key: Option<String>,

    /// Pexels request timeout in seconds (default: 30)
    pub pexels_timeout_secs: u64,

    /// Per-user cooldown for fetch commands in seconds (default: 10)
    pub command_cooldown_secs: u64,

    /// Embed accent color (default: 0xE74C3C)
    pub embed_color: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            gateway_url: env::var("GATEWAY_URL")
                .unwrap_or_else(|_| "ws://localhost:8080/api/gateway/bot".into()),
            api_url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?,
            application_id: env::var("APPLICATION_ID")
                .ok()
                .map(|v| v.parse::<Uuid>())
                .transpose()
                .context("APPLICATION_ID must be a UUID")?,
            owner_ids: env::var("BOT_OWNER_IDS")
                .ok()
                .map(|s| parse_uuid_list(&s))
                .transpose()
                .context("BOT_OWNER_IDS must be comma-separated UUIDs")?
                .unwrap_or_default(),
            redis_url: env::var("REDIS_URL").ok(),
            redis_key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "pexels".into()),
            pexels_api_url: env::var("PEXELS_API_URL")
                .unwrap_or_else(|_| "https://api.pexels.com".into()),
            pexels_api_key: env::var("PEXELS_API_KEY").ok().filter(|k| !k.is_empty()),
            pexels_timeout_secs: env::var("PEXELS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            command_cooldown_secs: env::var("COMMAND_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            embed_color: env::var("EMBED_COLOR")
                .ok()
                .and_then(|v| parse_color(&v))
                .unwrap_or(0xE74C3C),
        })
    }

    #[must_use]
    pub const fn pexels_timeout(&self) -> Duration {
        Duration::from_secs(self.pexels_timeout_secs)
    }

    #[must_use]
    pub const fn command_cooldown(&self) -> Duration {
        Duration::from_secs(self.command_cooldown_secs)
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            gateway_url: "ws://127.0.0.1:8080/api/gateway/bot".into(),
            api_url: "http://127.0.0.1:8080".into(),
            bot_token: "test-token".into(),
            application_id: None,
            owner_ids: Vec::new(),
            redis_url: None,
            redis_key_prefix: "pexels-test".into(),
            pexels_api_url: "http://127.0.0.1:9".into(),
            pexels_api_key: None,
            pexels_timeout_secs: 5,
            command_cooldown_secs: 10,
            embed_color: 0xE74C3C,
        }
    }
}

fn parse_uuid_list(s: &str) -> Result<Vec<Uuid>, uuid::Error> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse::<Uuid>)
        .collect()
}

/// Accepts "0xRRGGBB", "#RRGGBB" or a decimal integer.
fn parse_color(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('#')) {
        return u32::from_str_radix(hex, 16).ok();
    }
    s.parse().ok()
}
