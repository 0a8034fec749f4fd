//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_generator;
pub mod news_source;
pub mod prompt_generator;
pub mod publisher;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::AdapterError;

/// Retrieve the next recorded output for a given port and method.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, AdapterError> {
    let mut guard = replayer
        .lock()
        .map_err(|e| AdapterError::Replay(format!("replayer lock poisoned: {e}")))?;
    guard.next_interaction(port, method).map(|i| i.output.clone()).map_err(AdapterError::Replay)
}

/// Turn a replayed output back into the port's `Result`.
///
/// Recorded errors come back as [`AdapterError::Replay`] carrying the
/// original message.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: Result<serde_json::Value, AdapterError>,
) -> Result<T, AdapterError> {
    let output = output?;
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(AdapterError::Replay(msg));
    }
    let value = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| AdapterError::Replay(format!("recorded output does not match port: {e}")))
}
