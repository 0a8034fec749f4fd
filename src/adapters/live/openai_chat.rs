//! Live adapter for the `OpenAI` chat completions API.

use reqwest::Client;
use serde::Deserialize;

use super::{endpoint, read_json};
use crate::error::AdapterError;
use crate::ports::prompt_generator::{ChatFuture, PromptGenerator};

const CHAT_PATH: &str = "v1/chat/completions";

/// Single-turn chat against an `OpenAI` model.
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    /// Create a chat adapter for the given model.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self { client, base_url: base_url.into(), api_key, model, temperature }
    }
}

impl PromptGenerator for OpenAiChat {
    fn chat(&self, text: &str) -> ChatFuture<'_> {
        let text = text.to_string();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": self.model,
                "temperature": self.temperature,
                "messages": [{ "role": "user", "content": text }],
            });

            let response = self
                .client
                .post(endpoint(&self.base_url, CHAT_PATH))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let parsed: ChatResponse = read_json(response).await?;
            parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| AdapterError::Decode("no choices returned from chat API".into()))
        })
    }
}

// --- Chat completions response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}
