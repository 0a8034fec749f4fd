//! News source port.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// A news article as fetched from a news source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline.
    pub title: String,
    /// Body text, or the source's abstract of it.
    pub body: String,
    /// Publication date.
    pub published: NaiveDate,
    /// Canonical URL of the article.
    pub url: String,
    /// Display name of the publication.
    pub source: String,
}

/// Boxed future type returned by [`NewsSource::main_article`].
pub type ArticleFuture<'a> = Pin<Box<dyn Future<Output = Result<Article, AdapterError>> + Send + 'a>>;

/// Yields the current main article from an external news service.
///
/// What counts as "main" is up to each implementation.
pub trait NewsSource: Send + Sync {
    /// Fetch the main article.
    fn main_article(&self) -> ArticleFuture<'_>;
}
