//! Recording adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_generator::{GenerateFuture, ImageGenerator};

/// Records image generation interactions while delegating to an inner implementation.
pub struct RecordingImageGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate_image(&self, prompt: &str) -> GenerateFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let result = self.inner.generate_image(&prompt).await;
            // The generator name rides along so a replay can report the same one.
            let input = serde_json::json!({ "prompt": prompt, "generator": self.inner.name() });
            record_result(&self.recorder, "image_generator", "generate_image", &input, &result);
            result
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
