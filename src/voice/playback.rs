//! Voice-channel playback
//!
//! Synthesizes a reply and plays it into the sender's voice channel through
//! songbird. Playback is exclusive per guild: a guild has at most one voice
//! connection, so concurrent requests for the same guild wait their turn.
//! The synthesized audio lives in a per-request temp file that is removed
//! when the request finishes, whatever the outcome.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId};
use songbird::input::File as AudioFile;
use songbird::{Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::{Mutex, OwnedMutexGuard, oneshot};

use crate::pipeline::Speaker;
use crate::voice::TextToSpeech;
use crate::{Error, Result};

/// Per-guild playback locks: at most one active playback per guild
#[derive(Default)]
struct PlaybackLocks {
    guilds: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl PlaybackLocks {
    async fn acquire(&self, guild_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guilds = self.guilds.lock().await;
            Arc::clone(guilds.entry(guild_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Plays synthesized replies into Discord voice channels
pub struct VoicePlayer {
    manager: Arc<Songbird>,
    tts: TextToSpeech,
    locks: PlaybackLocks,
}

impl VoicePlayer {
    /// Create a new voice player over a songbird manager
    #[must_use]
    pub fn new(manager: Arc<Songbird>, tts: TextToSpeech) -> Self {
        Self {
            manager,
            tts,
            locks: PlaybackLocks::default(),
        }
    }

    /// Synthesize `text` and play it in the given guild voice channel.
    ///
    /// Reuses the guild's existing voice connection if one is active,
    /// otherwise joins `channel_id`. Disconnects after playback.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis, the voice connection, or playback setup
    /// fails. A failed synthesis never reaches the voice gateway.
    pub async fn play_reply(&self, guild_id: u64, channel_id: u64, text: &str) -> Result<()> {
        let _guard = self.locks.acquire(guild_id).await;

        let audio = self.tts.synthesize(text).await?;

        // Per-request artifact, removed when the handle drops
        let mut artifact = tempfile::Builder::new()
            .prefix("parakeet-reply-")
            .suffix(".mp3")
            .tempfile()?;
        artifact.write_all(&audio)?;
        artifact.flush()?;

        let guild = GuildId::new(guild_id);
        let call = match self.manager.get(guild) {
            Some(call) => call,
            None => self
                .manager
                .join(guild, ChannelId::new(channel_id))
                .await
                .map_err(|e| Error::Voice(format!("failed to join voice channel: {e}")))?,
        };

        let (tx, rx) = oneshot::channel();
        let done = Arc::new(Mutex::new(Some(tx)));

        let input = AudioFile::new(artifact.path().to_path_buf());
        let handle = {
            let mut call = call.lock().await;
            call.play_input(input.into())
        };
        handle
            .add_event(
                Event::Track(TrackEvent::End),
                TrackEndNotifier {
                    done: Arc::clone(&done),
                },
            )
            .map_err(|e| Error::Voice(format!("failed to watch track end: {e}")))?;
        handle
            .add_event(Event::Track(TrackEvent::Error), TrackEndNotifier { done })
            .map_err(|e| Error::Voice(format!("failed to watch track error: {e}")))?;

        tracing::info!(
            guild_id,
            audio_bytes = audio.len(),
            "playing reply in voice channel"
        );

        // Resolved by the end-of-track (or track error) event
        let _ = rx.await;

        if let Err(e) = self.manager.remove(guild).await {
            tracing::warn!(guild_id, error = %e, "error leaving voice channel");
        }

        tracing::debug!(guild_id, "playback complete");
        Ok(())
    }
}

#[async_trait]
impl Speaker for VoicePlayer {
    async fn speak(&self, guild_id: u64, channel_id: u64, text: &str) -> Result<()> {
        self.play_reply(guild_id, channel_id, text).await
    }
}

/// Resolves the playback future when the track ends or errors
struct TrackEndNotifier {
    done: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        if let Some(tx) = self.done.lock().await.take() {
            let _ = tx.send(());
        }
        None
    }
}
