//! Recording adapter for the `NewsSource` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::news_source::{ArticleFuture, NewsSource};

/// Records article fetches while delegating to an inner implementation.
pub struct RecordingNewsSource {
    inner: Box<dyn NewsSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingNewsSource {
    /// Creates a new recording source wrapping the given implementation.
    pub fn new(inner: Box<dyn NewsSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl NewsSource for RecordingNewsSource {
    fn main_article(&self) -> ArticleFuture<'_> {
        Box::pin(async move {
            let result = self.inner.main_article().await;
            record_result(&self.recorder, "news_source", "main_article", &(), &result);
            result
        })
    }
}
