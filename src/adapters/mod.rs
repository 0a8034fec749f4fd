//! Adapter implementations for port traits.
//!
//! - `live/`: Real API implementations
//! - `recording/`: Record interactions to cassettes
//! - `replaying/`: Replay interactions from cassettes
//! - `disabled`: Stand-ins for ports a command leaves unused

pub mod disabled;
pub mod live;
pub mod recording;
pub mod replaying;
