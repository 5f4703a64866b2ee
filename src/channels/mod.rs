//! Messaging channel adapters
//!
//! Each channel implements the `Channel` trait to provide unified messaging.
//! Parakeet ships a single Discord adapter; the trait is the seam the
//! pipeline (and its tests) talk through.

mod discord;

use async_trait::async_trait;

pub use discord::DiscordChannel;

use crate::Result;

/// Type of attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Image file (JPEG, PNG, GIF, etc.)
    Image,
    /// Audio file (MP3, WAV, OGG, etc.)
    Audio,
    /// Video file (MP4, MOV, etc.)
    Video,
    /// Generic file
    File,
}

impl AttachmentKind {
    /// Determine attachment kind from MIME type
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        let lower = mime_type.to_lowercase();
        if lower.starts_with("image/") {
            Self::Image
        } else if lower.starts_with("audio/") {
            Self::Audio
        } else if lower.starts_with("video/") {
            Self::Video
        } else {
            Self::File
        }
    }
}

/// An attachment on an incoming message
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Type of attachment
    pub kind: AttachmentKind,

    /// URL to download the attachment
    pub url: String,

    /// Declared MIME type
    pub mime_type: String,

    /// Original filename
    pub filename: Option<String>,
}

impl Attachment {
    /// Create an attachment from a URL and its declared MIME type
    #[must_use]
    pub fn from_url(url: String, mime_type: String, filename: Option<String>) -> Self {
        Self {
            kind: AttachmentKind::from_mime(&mime_type),
            url,
            mime_type,
            filename,
        }
    }
}

/// A message from a channel
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Message identifier (platform-specific)
    pub id: String,

    /// Text channel identifier (for replies)
    pub channel_id: String,

    /// Sender identifier
    pub sender_id: String,

    /// Sender display name
    pub sender_name: String,

    /// Message content
    pub content: String,

    /// Guild (voice-channel group) the message was sent in, if any
    pub guild_id: Option<u64>,

    /// Voice channel the sender is currently connected to, if any
    pub voice_channel_id: Option<u64>,

    /// Attachments on the message
    pub attachments: Vec<Attachment>,
}

/// A message to send to a channel
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    /// Text channel identifier
    pub channel_id: String,

    /// Message content (plain text)
    pub content: String,
}

impl OutgoingMessage {
    /// Create a simple text message
    #[must_use]
    pub fn text(channel_id: String, content: String) -> Self {
        Self {
            channel_id,
            content,
        }
    }
}

/// Trait for messaging channel adapters
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &'static str;

    /// Connect to the channel
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from the channel
    async fn disconnect(&mut self) -> Result<()>;

    /// Send a message
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}
