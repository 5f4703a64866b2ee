//! Configuration management for parakeet
//!
//! All configuration is environment-backed: a Discord token, an API key for
//! the transcription/completion provider, and an API key for the weather
//! provider. There is no config file and no persisted state.

use std::env;

use crate::{Error, Result};

/// Default synthesis language (BCP-47 style short code)
pub const DEFAULT_TTS_LANGUAGE: &str = "en";

/// Parakeet configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Voice synthesis configuration
    pub voice: VoiceConfig,
}

/// API keys for external services
#[derive(Debug, Clone)]
pub struct ApiKeys {
    /// Discord bot token
    pub discord: String,

    /// Naga API key (transcription + chat completion)
    pub naga: String,

    /// WeatherAPI key (current conditions)
    pub weather: String,
}

/// Voice synthesis configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Synthesis language passed to the TTS endpoint
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_TTS_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads `DISCORD_TOKEN`, `NAGA_API_KEY`, `WEATHER_API_KEY` (all
    /// required) and `TTS_LANGUAGE` (optional, default `en`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_keys: ApiKeys {
                discord: require("DISCORD_TOKEN")?,
                naga: require("NAGA_API_KEY")?,
                weather: require("WEATHER_API_KEY")?,
            },
            voice: VoiceConfig {
                language: env::var("TTS_LANGUAGE")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_TTS_LANGUAGE.to_string()),
            },
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is not set")))
}
