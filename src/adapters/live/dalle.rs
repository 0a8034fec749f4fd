//! Live adapter for the `OpenAI` image generation API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{body_preview, endpoint, read_json};
use crate::error::AdapterError;
use crate::ports::image_generator::{GenerateFuture, ImageGenerator, ImageLocation};

const IMAGES_PATH: &str = "v1/images/generations";

/// Generates one hosted image per prompt with a DALL-E model.
pub struct DalleGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    size: String,
}

impl DalleGenerator {
    /// Create a generator for the given model and pixel size.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: String,
        model: String,
        size: String,
    ) -> Self {
        Self { client, base_url: base_url.into(), api_key, model, size }
    }
}

impl ImageGenerator for DalleGenerator {
    fn generate_image(&self, prompt: &str) -> GenerateFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
                "response_format": "url",
            });

            let response = self
                .client
                .post(endpoint(&self.base_url, IMAGES_PATH))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let parsed: ImagesResponse = read_json(response).await?;

            if let Some(url) = parsed.data.iter().find_map(|item| item.url.clone()) {
                return Ok(ImageLocation::new(url));
            }
            let entries = serde_json::to_string(&parsed.data).unwrap_or_default();
            Err(AdapterError::Decode(format!(
                "No image URL in response. Body: {}",
                body_preview(&entries)
            )))
        })
    }

    fn name(&self) -> &str {
        "DALL-E"
    }
}

// --- Images API response types ---

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Serialize)]
struct ImageData {
    url: Option<String>,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}
