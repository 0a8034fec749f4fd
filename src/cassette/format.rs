//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded pipeline session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable session name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in the order they completed.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name, e.g. `"news_source"` or `"publisher.x"`.
    pub port: String,
    /// Method name on the port.
    pub method: String,
    /// Call arguments.
    pub input: serde_json::Value,
    /// `{"Ok": value}` or `{"Err": message}`.
    pub output: serde_json::Value,
}
