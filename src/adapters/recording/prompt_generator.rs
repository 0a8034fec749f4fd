//! Recording adapter for the `PromptGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::prompt_generator::{ChatFuture, PromptGenerator};

/// Records chat completions while delegating to an inner implementation.
pub struct RecordingPromptGenerator {
    inner: Box<dyn PromptGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingPromptGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn PromptGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl PromptGenerator for RecordingPromptGenerator {
    fn chat(&self, text: &str) -> ChatFuture<'_> {
        let text = text.to_string();
        Box::pin(async move {
            let result = self.inner.chat(&text).await;
            let input = serde_json::json!({ "text": text });
            record_result(&self.recorder, "prompt_generator", "chat", &input, &result);
            result
        })
    }
}
