//! Recording adapters that capture interactions to cassettes.

pub mod image_generator;
pub mod news_source;
pub mod prompt_generator;
pub mod publisher;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

/// Record one call on the shared recorder.
///
/// Recording never fails the call being recorded. A poisoned lock drops the
/// interaction with a warning.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    match recorder.lock() {
        Ok(mut guard) => guard.record_call(port, method, input, result),
        Err(e) => warn!(port, method, error = %e, "Recorder lock poisoned, interaction dropped"),
    }
}
