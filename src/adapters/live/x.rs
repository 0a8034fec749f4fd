//! Live publisher for X (formerly Twitter).

use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{endpoint, fetch_bytes, read_json};
use crate::caption::{fit_caption, X_CAPTION_LIMIT};
use crate::error::AdapterError;
use crate::ports::publisher::{PublishFuture, PublishRequest, Publisher};

const MEDIA_UPLOAD_PATH: &str = "2/media/upload";
const TWEETS_PATH: &str = "2/tweets";

/// Posts the image with the prompt as the tweet text.
pub struct XPublisher {
    client: Client,
    base_url: String,
    access_token: String,
}

impl XPublisher {
    /// Create a publisher that acts as the owner of `access_token`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, access_token: String) -> Self {
        Self { client, base_url: base_url.into(), access_token }
    }

    async fn upload_media(&self, image: &[u8]) -> Result<String, AdapterError> {
        let media_type = image::guess_format(image).map_or("image/png", |f| f.to_mime_type());
        let body = serde_json::json!({
            "media": base64::engine::general_purpose::STANDARD.encode(image),
            "media_category": "tweet_image",
            "media_type": media_type,
        });

        let response = self
            .client
            .post(endpoint(&self.base_url, MEDIA_UPLOAD_PATH))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let parsed: MediaUploadResponse = read_json(response).await?;
        Ok(parsed.data.id)
    }

    async fn create_tweet(&self, text: &str, media_id: &str) -> Result<(), AdapterError> {
        let body = serde_json::json!({
            "text": text,
            "media": { "media_ids": [media_id] },
        });

        let response = self
            .client
            .post(endpoint(&self.base_url, TWEETS_PATH))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api { status: status.as_u16(), message });
        }
        Ok(())
    }
}

impl Publisher for XPublisher {
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> PublishFuture<'a> {
        Box::pin(async move {
            let image = fetch_bytes(&self.client, request.image.as_str()).await?;
            let media_id = self.upload_media(&image).await?;
            debug!(media_id = %media_id, "Uploaded media to X");

            let text = fit_caption(self.name(), &request.prompt, X_CAPTION_LIMIT);
            self.create_tweet(&text, &media_id).await
        })
    }

    fn name(&self) -> &str {
        "x"
    }
}

// --- X API response types ---

#[derive(Deserialize)]
struct MediaUploadResponse {
    data: MediaData,
}

#[derive(Deserialize)]
struct MediaData {
    id: String,
}
