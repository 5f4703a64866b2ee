//! Text-to-speech (TTS) processing
//!
//! Synthesizes speech through the translate-TTS HTTP endpoint. The endpoint
//! only accepts short inputs, so longer replies are split into word-boundary
//! chunks and the returned MP3 segments concatenated.

use std::time::Instant;

use reqwest::Client;

use crate::{Error, Result};

/// Default synthesis endpoint
const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Maximum characters the endpoint accepts per request
const MAX_CHUNK_LEN: usize = 100;

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: Client,
    endpoint: String,
    language: String,
}

impl TextToSpeech {
    /// Create a new TTS instance for the given language (e.g. `en`)
    #[must_use]
    pub fn new(client: Client, language: String) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language,
        }
    }

    /// Override the synthesis endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if the text is empty or any synthesis request fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let start = Instant::now();

        let chunks = chunk_text(text, MAX_CHUNK_LEN);
        if chunks.is_empty() {
            return Err(Error::Tts("nothing to synthesize".to_string()));
        }

        let mut audio = Vec::new();
        let total = chunks.len();
        for (idx, chunk) in chunks.iter().enumerate() {
            let url = format!(
                "{}?ie=UTF-8&q={}&tl={}&total={total}&idx={idx}&client=tw-ob&textlen={}",
                self.endpoint,
                urlencoding::encode(chunk),
                self.language,
                chunk.chars().count()
            );

            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::Tts(format!("synthesis error {status}")));
            }
            audio.extend_from_slice(&response.bytes().await?);
        }

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            chunks = total,
            audio_bytes = audio.len(),
            "speech synthesized"
        );
        Ok(audio)
    }
}

/// Split text into whitespace-separated chunks of at most `max_len` bytes.
///
/// Words longer than `max_len` are hard-split on char boundaries.
fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.len() > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut piece = String::new();
            for ch in word.chars() {
                if piece.len() + ch.len_utf8() > max_len {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(ch);
            }
            if !piece.is_empty() {
                chunks.push(piece);
            }
            continue;
        }

        if !current.is_empty() && current.len() + 1 + word.len() > max_len {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("The current weather is Sunny", 100);
        assert_eq!(chunks, vec!["The current weather is Sunny"]);
    }

    #[test]
    fn long_text_splits_on_word_boundaries() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 20);
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn overlong_word_is_hard_split() {
        let word = "a".repeat(25);
        let chunks = chunk_text(&word, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("   ", 100).is_empty());
    }
}
