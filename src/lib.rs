//! Parakeet - Discord voice-message assistant
//!
//! This library provides the core functionality for the parakeet bot:
//! - Voice-message transcription via a remote speech-to-text API
//! - Intent resolution (weather lookups) over the transcription
//! - Reply generation via a remote chat-completion API
//! - Speech synthesis and playback into the sender's voice channel
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Discord                          │
//! │   voice-note attachments  │  text notices  │  voice │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Pipeline                             │
//! │   STT  →  Intent  →  (Weather)  →  Reply  →  TTS   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Remote APIs (HTTP)                        │
//! │   transcription │ weather │ completion │ speech     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod channels;
pub mod config;
pub mod daemon;
pub mod error;
pub mod intent;
pub mod pipeline;
pub mod voice;
pub mod weather;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use intent::{Intent, IntentResolver};
pub use pipeline::{PipelineOutcome, VoicePipeline};
pub use weather::{WeatherSnapshot, format_weather};
