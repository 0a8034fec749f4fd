//! Live publisher for Instagram via the Graph API content publishing flow.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{endpoint, read_json};
use crate::caption::{attributed_caption, fit_caption, INSTAGRAM_CAPTION_LIMIT};
use crate::error::AdapterError;
use crate::ports::publisher::{PublishFuture, PublishRequest, Publisher};

/// Posts the image with a caption crediting the article and the generator.
///
/// Instagram fetches the image from its URL itself, so nothing is downloaded
/// here.
pub struct InstagramPublisher {
    client: Client,
    base_url: String,
    api_version: String,
    access_token: String,
    user_id: String,
}

impl InstagramPublisher {
    /// Create a publisher for the business account `user_id`.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_version: String,
        access_token: String,
        user_id: String,
    ) -> Self {
        Self { client, base_url: base_url.into(), api_version, access_token, user_id }
    }

    fn account_url(&self, edge: &str) -> String {
        endpoint(&self.base_url, &format!("{}/{}/{edge}", self.api_version, self.user_id))
    }

    async fn post(&self, edge: &str, body: serde_json::Value) -> Result<String, AdapterError> {
        let response = self
            .client
            .post(self.account_url(edge))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let parsed: GraphId = read_json(response).await?;
        Ok(parsed.id)
    }
}

impl Publisher for InstagramPublisher {
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> PublishFuture<'a> {
        Box::pin(async move {
            let caption =
                fit_caption(self.name(), &attributed_caption(request), INSTAGRAM_CAPTION_LIMIT);

            let container = self
                .post(
                    "media",
                    serde_json::json!({ "image_url": request.image.as_str(), "caption": caption }),
                )
                .await?;
            debug!(container = %container, "Created Instagram media container");

            let media = self
                .post("media_publish", serde_json::json!({ "creation_id": container }))
                .await?;
            debug!(media = %media, "Published Instagram media");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "instagram"
    }
}

#[derive(Deserialize)]
struct GraphId {
    id: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::ports::{Article, ImageLocation};

    fn request() -> PublishRequest {
        PublishRequest {
            image: ImageLocation::new("https://images.example.com/dog.png"),
            prompt: "a pink balloon dog".into(),
            generator: "DALL-E".into(),
            article: Article {
                title: "Balloons everywhere".into(),
                body: "B".into(),
                published: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                url: "https://news.example.com/balloons".into(),
                source: "Example".into(),
            },
        }
    }

    fn publisher_for(server: &MockServer) -> InstagramPublisher {
        InstagramPublisher::new(
            Client::new(),
            server.uri(),
            "v21.0".into(),
            "ig-token".into(),
            "17841400000000000".into(),
        )
    }

    #[tokio::test]
    async fn creates_container_then_publishes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v21.0/17841400000000000/media"))
            .and(header("authorization", "Bearer ig-token"))
            .and(body_partial_json(json!({
                "image_url": "https://images.example.com/dog.png",
                "caption": "AI Generated Content\n\nBalloons everywhere \nhttps://news.example.com/balloons\n\nCreated by DALL-E with the prompt:\n\na pink balloon dog"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "container-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v21.0/17841400000000000/media_publish"))
            .and(body_partial_json(json!({"creation_id": "container-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "media-1"})))
            .expect(1)
            .mount(&server)
            .await;

        publisher_for(&server).publish(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn container_failure_skips_publish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v21.0/17841400000000000/media"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid image"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v21.0/17841400000000000/media_publish"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = publisher_for(&server).publish(&request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Api { status: 400, .. }));
    }
}
