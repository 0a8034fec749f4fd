//! Replaying adapter for the `NewsSource` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::news_source::{ArticleFuture, NewsSource};

/// Serves recorded articles from a cassette.
pub struct ReplayingNewsSource {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingNewsSource {
    /// Create a replaying source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl NewsSource for ReplayingNewsSource {
    fn main_article(&self) -> ArticleFuture<'_> {
        let output = next_output(&self.replayer, "news_source", "main_article");
        Box::pin(async move { replay_result(output) })
    }
}
