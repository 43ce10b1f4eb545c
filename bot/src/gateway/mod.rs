//! Bot Gateway Client
//!
//! Keeps a WebSocket session to the host's bot gateway, runs each command
//! invocation on its own task and writes replies back through a single
//! writer task. Reconnects with exponential backoff.

pub mod events;
pub mod rest;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{InvalidHeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::commands::Dispatcher;
use events::{BotClientEvent, BotServerEvent};

/// Longest wait between reconnect attempts, as a power of two in seconds.
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Errors that end a gateway session.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    /// Bot token is not a valid header value.
    #[error("Invalid bot token: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),
}

/// Gateway client.
pub struct Gateway {
    url: String,
    bot_token: String,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    pub fn new(url: impl Into<String>, bot_token: impl Into<String>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            url: url.into(),
            bot_token: bot_token.into(),
            dispatcher,
        }
    }

    /// Run sessions until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut consecutive_errors: u32 = 0;

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Gateway shutting down");
                    return;
                }
                result = self.session() => match result {
                    Ok(()) => {
                        consecutive_errors = 0;
                        warn!("Gateway connection closed, reconnecting");
                    }
                    Err(GatewayError::InvalidToken(e)) => {
                        error!(error = %e, "Bot token cannot be sent as a header; giving up");
                        return;
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        error!(error = %e, attempt = consecutive_errors, "Gateway session failed");
                    }
                },
            }

            let backoff_secs = 1u64 << consecutive_errors.clamp(1, MAX_BACKOFF_SHIFT);
            tokio::select! {
                () = &mut shutdown => {
                    info!("Gateway shutting down");
                    return;
                }
                () = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
            }
        }
    }

    /// One connection. `Ok` means the server closed it cleanly.
    async fn session(&self) -> Result<(), GatewayError> {
        let mut request = self.url.as_str().into_client_request()?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bot {}", self.bot_token))?,
        );

        let (socket, _) = tokio_tungstenite::connect_async(request).await?;
        info!(url = %self.url, "Connected to bot gateway");

        let (mut sender, mut receiver) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<BotClientEvent>();

        // Forward replies to the server
        let writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break; // Connection closed
                        }
                    }
                    Err(e) => {
                        error!("Failed to serialize bot event: {}", e);
                    }
                }
            }
        });

        let result = loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) => self.handle_text(text.as_str(), &tx),
                Some(Ok(Message::Close(_))) | None => break Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e.into()),
            }
        };

        writer.abort();
        result
    }

    fn handle_text(&self, text: &str, tx: &mpsc::UnboundedSender<BotClientEvent>) {
        let event = match serde_json::from_str::<BotServerEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to parse gateway event: {}", e);
                return;
            }
        };

        match event {
            BotServerEvent::GuildJoined {
                guild_id,
                guild_name,
            } => info!(guild_id = %guild_id, guild_name = %guild_name, "Added to guild"),
            BotServerEvent::GuildLeft { guild_id } => info!(guild_id = %guild_id, "Removed from guild"),
            BotServerEvent::Error { code, message } => {
                warn!(code = %code, message = %message, "Gateway reported an error");
            }
            BotServerEvent::MessageCreated { message_id, .. } => {
                debug!(message_id = %message_id, "Ignoring message event");
            }
            invoked @ BotServerEvent::CommandInvoked { .. } => {
                let Some((interaction_id, invocation)) = invoked.into_invocation() else {
                    return;
                };
                let dispatcher = Arc::clone(&self.dispatcher);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reply = dispatcher.dispatch(&invocation).await;
                    if tx.send(BotClientEvent::response(interaction_id, reply)).is_err() {
                        warn!(interaction_id = %interaction_id, "Session ended before reply was sent");
                    }
                });
            }
        }
    }
}
