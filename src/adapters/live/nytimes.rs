//! Live adapter for the New York Times Top Stories API.

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use super::{endpoint, read_json};
use crate::error::AdapterError;
use crate::ports::news_source::{Article, ArticleFuture, NewsSource};

const TOP_STORIES_PATH: &str = "svc/topstories/v2/home.json";
const SOURCE_NAME: &str = "The New York Times";

/// Takes the first story on the New York Times home page as the main article.
pub struct NyTimesSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NyTimesSource {
    /// Create a source against the given API base URL.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: String) -> Self {
        Self { client, base_url: base_url.into(), api_key }
    }
}

impl NewsSource for NyTimesSource {
    fn main_article(&self) -> ArticleFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .get(endpoint(&self.base_url, TOP_STORIES_PATH))
                .query(&[("api-key", self.api_key.as_str())])
                .send()
                .await?;

            let parsed: TopStoriesResponse = read_json(response).await?;
            let story = parsed
                .results
                .into_iter()
                .next()
                .ok_or_else(|| AdapterError::Decode("no articles found".to_string()))?;

            let published = DateTime::parse_from_rfc3339(&story.published_date)
                .map_err(|e| {
                    AdapterError::Decode(format!(
                        "invalid published_date '{}': {e}",
                        story.published_date
                    ))
                })?
                .date_naive();

            Ok(Article {
                title: story.title,
                body: story.summary,
                published,
                url: story.url,
                source: SOURCE_NAME.to_string(),
            })
        })
    }
}

// --- Top Stories API response types ---

#[derive(Deserialize)]
struct TopStoriesResponse {
    results: Vec<Story>,
}

#[derive(Deserialize)]
struct Story {
    title: String,
    #[serde(rename = "abstract")]
    summary: String,
    #[serde(default)]
    url: String,
    published_date: String,
}
