//! Collects port calls during a live run and writes them out as a cassette.

use std::fmt::Display;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use super::format::{Cassette, Interaction};

/// Accumulates interactions for one session and saves them as YAML.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Start a session that will be saved to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), name: name.into(), commit: commit.into(), interactions: Vec::new() }
    }

    /// Append one call and its outcome.
    ///
    /// The output is stored as `{"Ok": value}` or `{"Err": message}`. A value
    /// that cannot be serialized becomes `null` and the call is still kept.
    pub fn record_call<I, T, E>(&mut self, port: &str, method: &str, input: &I, result: &Result<T, E>)
    where
        I: Serialize,
        T: Serialize,
        E: Display,
    {
        let output = match result {
            Ok(value) => json!({ "Ok": to_value(value, port) }),
            Err(e) => json!({ "Err": e.to_string() }),
        };
        self.interactions.push(Interaction {
            seq: self.interactions.len() as u64,
            port: port.to_string(),
            method: method.to_string(),
            input: to_value(input, port),
            output,
        });
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Write the cassette, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be produced or written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let Self { path, name, commit, interactions } = self;
        let cassette = Cassette { name, recorded_at: Utc::now(), commit, interactions };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, yaml)?;
        Ok(path)
    }
}

fn to_value<V: Serialize>(value: &V, port: &str) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(port, error = %e, "Failed to serialize interaction for cassette");
        Value::Null
    })
}
