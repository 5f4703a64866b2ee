//! Reply generation via a chat-completion API

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::pipeline::ReplyGenerator;
use crate::{Error, Result};

/// Default completion API base URL
const DEFAULT_BASE_URL: &str = "https://api.naga.ac";

/// Chat-completion model identifier
const COMPLETION_MODEL: &str = "llama-3-8b-instruct";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Generates conversational replies from free-text prompts
#[derive(Debug)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    /// Create a new completion client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(client: Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Naga API key required for completions".to_string(),
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

    /// Send `prompt` as a single user message and return the first
    /// completion's text.
    ///
    /// # Errors
    ///
    /// Returns error on any non-success status, or when the response carries
    /// no choices
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest {
            model: COMPLETION_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!(
                "completion API error {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("malformed completion response: {e}")))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Completion("response contained no choices".to_string()))?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            reply_len = reply.len(),
            "completion received"
        );
        Ok(reply)
    }
}

#[async_trait]
impl ReplyGenerator for CompletionClient {
    async fn reply(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}
