//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::image_generator::{GenerateFuture, ImageGenerator};

const PORT: &str = "image_generator";
const METHOD: &str = "generate_image";

/// Serves recorded image locations from a cassette.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
    name: String,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    ///
    /// The display name is the one recorded alongside the first generation,
    /// or `"replay"` if the cassette has none.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        let name = replayer
            .lock()
            .ok()
            .and_then(|r| {
                r.first_input(PORT, METHOD)
                    .and_then(|input| input.get("generator"))
                    .and_then(|g| g.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "replay".to_string());
        Self { replayer, name }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate_image(&self, _prompt: &str) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, PORT, METHOD);
        Box::pin(async move { replay_result(output) })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
