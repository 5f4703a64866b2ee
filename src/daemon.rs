//! Daemon - the bot service
//!
//! Wires the Discord channel to the voice-message pipeline and runs until
//! interrupted. Each inbound message gets its own task; shared-resource
//! safety lives in the pipeline's collaborators (per-guild playback locks,
//! per-request audio artifacts).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::agent::CompletionClient;
use crate::channels::{Channel, DiscordChannel};
use crate::pipeline::VoicePipeline;
use crate::voice::{SpeechToText, TextToSpeech, VoicePlayer};
use crate::weather::WeatherClient;
use crate::{Config, Error, Result};

/// Timeout applied to every outbound HTTP call
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The parakeet daemon
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if initialization fails; per-message pipeline failures
    /// are logged and never fatal.
    pub async fn run(self) -> Result<()> {
        // One shared HTTP client backs every outbound call
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let (mut discord, mut messages) =
            DiscordChannel::with_receiver(self.config.api_keys.discord.clone());
        discord.connect().await?;
        let manager = discord
            .voice()
            .ok_or_else(|| Error::Channel("voice manager unavailable".to_string()))?;
        let discord: Arc<dyn Channel> = Arc::new(discord);

        let stt = SpeechToText::new(http.clone(), self.config.api_keys.naga.clone())?;
        let weather = WeatherClient::new(http.clone(), self.config.api_keys.weather.clone())?;
        let completions = CompletionClient::new(http.clone(), self.config.api_keys.naga.clone())?;
        let tts = TextToSpeech::new(http, self.config.voice.language.clone());
        let player = VoicePlayer::new(manager, tts);

        let pipeline = Arc::new(VoicePipeline::new(
            Arc::new(stt),
            Arc::new(weather),
            Arc::new(completions),
            Arc::new(player),
            Arc::clone(&discord),
        ));

        // Shutdown on ctrl-c
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        tracing::info!("daemon running");

        loop {
            tokio::select! {
                maybe = messages.recv() => {
                    let Some(message) = maybe else { break };
                    let pipeline = Arc::clone(&pipeline);
                    tokio::spawn(async move {
                        match pipeline.handle(&message).await {
                            Ok(outcome) => {
                                tracing::debug!(?outcome, message_id = %message.id, "pipeline run finished");
                            }
                            Err(e) => {
                                tracing::error!(error = %e, message_id = %message.id, "pipeline run failed");
                            }
                        }
                    });
                }
                _ = shutdown_rx.recv() => break,
            }
        }

        tracing::info!("daemon stopped");
        Ok(())
    }
}
