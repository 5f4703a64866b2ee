//! Discord channel adapter using serenity
//!
//! Forwards messages carrying attachments to the pipeline, together with the
//! sender's current voice-channel membership, and posts text notices back.
//! Voice playback itself goes through songbird, which is registered on the
//! serenity client here and handed to the voice player.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::Client;
use serenity::all::{
    ActivityData, ChannelId, Context, CreateMessage, EventHandler, GatewayIntents, Message, Ready,
};
use songbird::{SerenityInit, Songbird};
use tokio::sync::mpsc;

use super::{Attachment, Channel, IncomingMessage, OutgoingMessage};
use crate::{Error, Result};

/// Presence shown while the bot is online
const PRESENCE: &str = "Transcribing Audio";

/// Discord channel adapter
pub struct DiscordChannel {
    token: String,
    message_tx: Option<mpsc::Sender<IncomingMessage>>,
    http: Option<Arc<serenity::http::Http>>,
    voice: Option<Arc<Songbird>>,
    connected: bool,
}

impl DiscordChannel {
    /// Create the channel and a receiver for incoming messages
    #[must_use]
    pub fn with_receiver(token: String) -> (Self, mpsc::Receiver<IncomingMessage>) {
        let (tx, rx) = mpsc::channel(100);
        let channel = Self {
            token,
            message_tx: Some(tx),
            http: None,
            voice: None,
            connected: false,
        };
        (channel, rx)
    }

    /// The songbird voice manager, once connected
    #[must_use]
    pub fn voice(&self) -> Option<Arc<Songbird>> {
        self.voice.clone()
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn connect(&mut self) -> Result<()> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_VOICE_STATES;

        let handler = DiscordHandler {
            message_tx: self.message_tx.clone(),
        };

        let voice = Songbird::serenity();

        let client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .register_songbird_with(Arc::clone(&voice))
            .await
            .map_err(|e| Error::Channel(format!("Discord client error: {e}")))?;

        self.http = Some(Arc::clone(&client.http));
        self.voice = Some(voice);

        // Run the gateway connection in a background task
        let mut client_runner = client;
        tokio::spawn(async move {
            if let Err(e) = client_runner.start().await {
                tracing::error!(error = %e, "Discord client error");
            }
        });

        self.connected = true;
        tracing::info!("Discord channel connected");

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        tracing::info!("Discord channel disconnected");
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| Error::Channel("Discord not connected".to_string()))?;

        let channel_id: u64 = message
            .channel_id
            .parse()
            .map_err(|_| Error::Channel("Invalid channel ID".to_string()))?;

        ChannelId::new(channel_id)
            .send_message(http, CreateMessage::new().content(&message.content))
            .await
            .map_err(|e| Error::Channel(format!("Discord send error: {e}")))?;

        tracing::debug!(channel_id = %message.channel_id, "Discord message sent");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Discord event handler
struct DiscordHandler {
    message_tx: Option<mpsc::Sender<IncomingMessage>>,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        ctx.set_activity(Some(ActivityData::playing(PRESENCE)));
        tracing::info!(user = %ready.user.name, "Discord bot ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bot messages and anything without an attachment
        if msg.author.bot || msg.attachments.is_empty() {
            return;
        }

        let guild_id = msg.guild_id.map(|id| id.get());

        // The sender's current voice channel, read from the gateway cache.
        // Resolved before any await: cache refs are not Send.
        let voice_channel_id = msg.guild_id.and_then(|gid| {
            ctx.cache.guild(gid).and_then(|guild| {
                guild
                    .voice_states
                    .get(&msg.author.id)
                    .and_then(|state| state.channel_id)
                    .map(|id| id.get())
            })
        });

        let attachments = msg
            .attachments
            .iter()
            .map(|att| {
                let mime_type = att
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                Attachment::from_url(att.url.clone(), mime_type, Some(att.filename.clone()))
            })
            .collect();

        let incoming = IncomingMessage {
            id: msg.id.to_string(),
            channel_id: msg.channel_id.to_string(),
            sender_id: msg.author.id.to_string(),
            sender_name: msg.author.name.clone(),
            content: msg.content.clone(),
            guild_id,
            voice_channel_id,
            attachments,
        };

        if let Some(tx) = self.message_tx.as_ref() {
            if let Err(e) = tx.send(incoming).await {
                tracing::warn!(error = %e, "Failed to forward Discord message");
            }
        }

        tracing::debug!(
            author = %msg.author.name,
            attachments = msg.attachments.len(),
            in_voice = voice_channel_id.is_some(),
            "Discord message received"
        );
    }
}
