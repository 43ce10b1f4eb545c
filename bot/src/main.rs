//! Pexels Bot - Main Entry Point

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use pexels_bot::commands::{catalog, Dispatcher};
use pexels_bot::config::Config;
use pexels_bot::credentials::{CredentialStore, MemoryCredentialStore, RedisCredentialStore};
use pexels_bot::gateway::rest::HostClient;
use pexels_bot::gateway::Gateway;
use pexels_bot::pexels::PexelsClient;
use pexels_bot::settings::{ConfigStore, MemoryConfigStore, PageSizeSettings, RedisConfigStore};
use pexels_bot::workflow::ImageFetchWorkflow;
use pexels_bot::db;

/// How often expired cooldown entries are dropped.
const COOLDOWN_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Install the rustls crypto provider before any TLS connection
    let _ =
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider());

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pexels_bot=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Pexels Bot");

    // Settings and credentials: Redis when configured, memory otherwise
    let redis = match &config.redis_url {
        Some(url) => Some(
            db::create_redis_client(url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        None => {
            warn!("REDIS_URL not set. Settings will not survive a restart.");
            None
        }
    };

    let config_store: Arc<dyn ConfigStore> = match &redis {
        Some(client) => Arc::new(RedisConfigStore::new(
            client.clone(),
            config.redis_key_prefix.clone(),
        )),
        None => Arc::new(MemoryConfigStore::new()),
    };

    let credentials: Arc<dyn CredentialStore> = match (&config.pexels_api_key, &redis) {
        (Some(key), _) => Arc::new(MemoryCredentialStore::with_pexels_token(key.clone())),
        (None, Some(client)) => Arc::new(RedisCredentialStore::new(
            client.clone(),
            config.redis_key_prefix.clone(),
        )),
        (None, None) => {
            warn!("No Pexels API key configured. Fetch commands will ask for one.");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let pexels = PexelsClient::new(&config.pexels_api_url, config.pexels_timeout())
        .context("Failed to build Pexels HTTP client")?;
    let workflow = ImageFetchWorkflow::new(PageSizeSettings::new(config_store), credentials, pexels);

    // Host REST client for command registration and guild lookups
    let host = HostClient::new(reqwest::Client::new(), &config.api_url, config.bot_token.clone());
    if let Some(application_id) = config.application_id {
        if let Err(e) = host
            .register_commands(application_id, &catalog::commands())
            .await
        {
            warn!("Slash command registration failed: {}. Existing commands stay in place.", e);
        }
    } else {
        info!("APPLICATION_ID not set, skipping slash command registration");
    }

    let dispatcher = Arc::new(Dispatcher::new(workflow, Arc::new(host), &config));

    // Periodically drop expired cooldowns
    let cleanup = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(COOLDOWN_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                dispatcher.cleanup_cooldowns();
            }
        })
    };

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    let gateway = Gateway::new(config.gateway_url.clone(), config.bot_token.clone(), dispatcher);
    gateway.run(shutdown_signal).await;

    cleanup.abort();
    info!("Bot shutdown complete");

    Ok(())
}
