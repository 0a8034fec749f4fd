//! Record/replay infrastructure for deterministic runs without network access.

pub mod format;
pub mod recorder;
pub mod replayer;

/// Port name used for the publisher called `name`.
#[must_use]
pub fn publisher_port(name: &str) -> String {
    format!("{PUBLISHER_PORT_PREFIX}{name}")
}

/// Prefix shared by all publisher port names.
pub const PUBLISHER_PORT_PREFIX: &str = "publisher.";
