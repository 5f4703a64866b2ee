//! Speech-to-text (STT) processing
//!
//! Fetches a voice-message attachment by URL and submits it to the
//! transcription endpoint as multipart form data.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::pipeline::Transcriber;
use crate::{Error, Result};

/// Default transcription/completion API base URL
const DEFAULT_BASE_URL: &str = "https://api.naga.ac";

/// Transcription model identifier
const TRANSCRIPTION_MODEL: &str = "whisper-large-v3";

/// Fixed upload filename for voice-message attachments
const UPLOAD_FILENAME: &str = "voice-message.ogg";

/// Fixed upload content type for voice-message attachments
const UPLOAD_MIME: &str = "audio/ogg";

/// Response from the transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes voice-message attachments to text
#[derive(Debug)]
pub struct SpeechToText {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SpeechToText {
    /// Create a new STT instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(client: Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Naga API key required for transcription".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fetch an audio resource and transcribe it
    ///
    /// # Errors
    ///
    /// Returns error if the audio fetch or the transcription call fails, or
    /// if the response carries no transcript
    pub async fn transcribe_url(&self, url: &str) -> Result<String> {
        let start = Instant::now();

        let fetch = self.client.get(url).send().await?;
        if !fetch.status().is_success() {
            return Err(Error::Stt(format!(
                "audio fetch failed with status {}",
                fetch.status()
            )));
        }
        let audio = fetch.bytes().await?;

        tracing::debug!(audio_bytes = audio.len(), "submitting audio for transcription");

        let form = Form::new()
            .part(
                "file",
                Part::bytes(audio.to_vec())
                    .file_name(UPLOAD_FILENAME)
                    .mime_str(UPLOAD_MIME)
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", TRANSCRIPTION_MODEL);

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Stt(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            Error::Stt(format!("transcription response missing transcript: {e}"))
        })?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            transcript = %result.text,
            "transcription complete"
        );
        Ok(result.text)
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, url: &str) -> Result<String> {
        self.transcribe_url(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let err = SpeechToText::new(Client::new(), String::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn parses_transcription_response() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "Tell me a joke"}"#).unwrap();
        assert_eq!(parsed.text, "Tell me a joke");
    }

    #[test]
    fn missing_transcript_field_is_an_error() {
        let parsed = serde_json::from_str::<TranscriptionResponse>(r#"{"status": "ok"}"#);
        assert!(parsed.is_err());
    }
}
