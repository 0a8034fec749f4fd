//! Replaying adapter for the `PromptGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::prompt_generator::{ChatFuture, PromptGenerator};

/// Serves recorded chat answers from a cassette, ignoring the input text.
pub struct ReplayingPromptGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingPromptGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl PromptGenerator for ReplayingPromptGenerator {
    fn chat(&self, _text: &str) -> ChatFuture<'_> {
        let output = next_output(&self.replayer, "prompt_generator", "chat");
        Box::pin(async move { replay_result(output) })
    }
}
