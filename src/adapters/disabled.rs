//! Stand-in adapters for ports a command does not use.

use crate::error::AdapterError;
use crate::ports::news_source::{ArticleFuture, NewsSource};

/// News source for commands that never fetch news.
pub struct DisabledNewsSource;

impl NewsSource for DisabledNewsSource {
    fn main_article(&self) -> ArticleFuture<'_> {
        Box::pin(async {
            Err(AdapterError::Config("news source is not configured for this command".into()))
        })
    }
}
