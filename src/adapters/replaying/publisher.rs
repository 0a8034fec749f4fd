//! Replaying adapter for the `Publisher` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::publisher_port;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::publisher::{PublishFuture, PublishRequest, Publisher};

/// Serves one publisher's recorded outcomes from a cassette.
pub struct ReplayingPublisher {
    replayer: Arc<Mutex<CassetteReplayer>>,
    name: String,
    port: String,
}

impl ReplayingPublisher {
    /// Create a replaying publisher for the recorded publisher `name`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>, name: impl Into<String>) -> Self {
        let name = name.into();
        let port = publisher_port(&name);
        Self { replayer, name, port }
    }
}

impl Publisher for ReplayingPublisher {
    fn publish<'a>(&'a self, _request: &'a PublishRequest) -> PublishFuture<'a> {
        let output = next_output(&self.replayer, &self.port, "publish");
        Box::pin(async move { replay_result(output) })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
