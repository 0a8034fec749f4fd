//! Recording adapter for the `Publisher` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::publisher_port;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::publisher::{PublishFuture, PublishRequest, Publisher};

/// Records publish attempts under a per-publisher port name.
pub struct RecordingPublisher {
    inner: Box<dyn Publisher>,
    port: String,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingPublisher {
    /// Creates a new recording publisher wrapping the given implementation.
    pub fn new(inner: Box<dyn Publisher>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        let port = publisher_port(inner.name());
        Self { inner, port, recorder }
    }
}

impl Publisher for RecordingPublisher {
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> PublishFuture<'a> {
        Box::pin(async move {
            let result = self.inner.publish(request).await;
            record_result(&self.recorder, &self.port, "publish", request, &result);
            result
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
