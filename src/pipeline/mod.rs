//! Voice-message response pipeline
//!
//! One run per inbound attachment: transcribe, resolve intent, optionally
//! look up weather, generate a reply, then synthesize and play it in the
//! sender's voice channel. Every failure is terminal for the current run
//! only and surfaces as a fixed text notice in the originating channel.

use std::sync::Arc;

use async_trait::async_trait;

use crate::channels::{AttachmentKind, Channel, IncomingMessage, OutgoingMessage};
use crate::intent::{Intent, IntentResolver};
use crate::weather::{WeatherSnapshot, format_weather};
use crate::Result;

/// Notice sent when transcription fails
pub const TRANSCRIPTION_FAILED_NOTICE: &str = "I couldn't transcribe the audio.";

/// Notice sent when reply generation fails or returns nothing
pub const RESPONSE_FAILED_NOTICE: &str = "I couldn't get a response from GPT.";

/// Notice sent when the sender has no active voice-channel membership
pub const NO_VOICE_CHANNEL_NOTICE: &str = "You are not connected to a voice channel.";

/// Transcribes an audio resource reachable by URL
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Fetch the resource and return its transcript
    async fn transcribe(&self, url: &str) -> Result<String>;
}

/// Looks up current conditions for a city
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch a current-conditions snapshot
    async fn current(&self, city: &str) -> Result<WeatherSnapshot>;
}

/// Generates a reply for a free-text prompt
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Return the generated reply text
    async fn reply(&self, prompt: &str) -> Result<String>;
}

/// Plays a synthesized reply into a guild voice channel
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Synthesize `text` and play it on the guild's voice connection
    async fn speak(&self, guild_id: u64, channel_id: u64, text: &str) -> Result<()>;
}

/// Terminal state of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The attachment was not audio; nothing happened
    Ignored,
    /// Transcription failed; the fixed notice was sent
    TranscriptionFailed,
    /// Reply generation failed or was empty; the fixed notice was sent
    ResponseFailed,
    /// The sender was not in a voice channel; the fixed notice was sent
    NoVoiceChannel,
    /// The reply was played back in full
    Played,
}

/// The voice-message response pipeline
pub struct VoicePipeline {
    transcriber: Arc<dyn Transcriber>,
    weather: Arc<dyn WeatherProvider>,
    replies: Arc<dyn ReplyGenerator>,
    speaker: Arc<dyn Speaker>,
    notices: Arc<dyn Channel>,
    intents: IntentResolver,
}

impl VoicePipeline {
    /// Assemble a pipeline from its collaborators
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        weather: Arc<dyn WeatherProvider>,
        replies: Arc<dyn ReplyGenerator>,
        speaker: Arc<dyn Speaker>,
        notices: Arc<dyn Channel>,
    ) -> Self {
        Self {
            transcriber,
            weather,
            replies,
            speaker,
            notices,
            intents: IntentResolver::new(),
        }
    }

    /// Run the pipeline for one inbound message.
    ///
    /// # Errors
    ///
    /// Returns error if a notice cannot be delivered or playback fails;
    /// upstream API failures are handled in place and reported through the
    /// returned [`PipelineOutcome`].
    pub async fn handle(&self, message: &IncomingMessage) -> Result<PipelineOutcome> {
        let Some(attachment) = message.attachments.first() else {
            return Ok(PipelineOutcome::Ignored);
        };
        if attachment.kind != AttachmentKind::Audio {
            return Ok(PipelineOutcome::Ignored);
        }

        tracing::info!(
            sender = %message.sender_name,
            url = %attachment.url,
            "processing voice message"
        );

        let transcription = match self.transcriber.transcribe(&attachment.url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                self.notify(message, TRANSCRIPTION_FAILED_NOTICE).await?;
                return Ok(PipelineOutcome::TranscriptionFailed);
            }
        };

        let prompt = match self.intents.resolve(&transcription) {
            Intent::Weather { city } => {
                let snapshot = match self.weather.current(&city).await {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        tracing::warn!(error = %e, city = %city, "weather lookup failed");
                        None
                    }
                };
                weather_prompt(&city, &format_weather(snapshot.as_ref()))
            }
            Intent::Direct => direct_prompt(&transcription),
        };

        let reply = match self.replies.reply(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                tracing::warn!("completion returned an empty reply");
                self.notify(message, RESPONSE_FAILED_NOTICE).await?;
                return Ok(PipelineOutcome::ResponseFailed);
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                self.notify(message, RESPONSE_FAILED_NOTICE).await?;
                return Ok(PipelineOutcome::ResponseFailed);
            }
        };

        let (Some(guild_id), Some(voice_channel_id)) =
            (message.guild_id, message.voice_channel_id)
        else {
            self.notify(message, NO_VOICE_CHANNEL_NOTICE).await?;
            return Ok(PipelineOutcome::NoVoiceChannel);
        };

        self.speaker
            .speak(guild_id, voice_channel_id, &reply)
            .await?;

        Ok(PipelineOutcome::Played)
    }

    async fn notify(&self, message: &IncomingMessage, notice: &str) -> Result<()> {
        self.notices
            .send(OutgoingMessage::text(
                message.channel_id.clone(),
                notice.to_string(),
            ))
            .await
    }
}

/// Prompt wrapping a formatted weather sentence for summarization
fn weather_prompt(city: &str, sentence: &str) -> String {
    format!("Summarize this weather information for {city} into one sentence: {sentence}")
}

/// Prompt answering the transcription directly
fn direct_prompt(transcription: &str) -> String {
    format!(
        "Answer with a brief text as a simple voice assistant to this message, try to be concise: {transcription}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_prompt_wraps_transcription() {
        assert_eq!(
            direct_prompt("Tell me a joke"),
            "Answer with a brief text as a simple voice assistant to this message, try to be concise: Tell me a joke"
        );
    }

    #[test]
    fn weather_prompt_names_city_and_sentence() {
        let prompt = weather_prompt(
            "Berlin",
            "The current weather is Sunny with a temperature of 20°C, feeling like 18°C.",
        );
        assert_eq!(
            prompt,
            "Summarize this weather information for Berlin into one sentence: The current weather is Sunny with a temperature of 20°C, feeling like 18°C."
        );
    }
}
