//! Newsgen - turns the day's main news story into an AI-generated image
//! and publishes it to social media.

pub mod adapters;
pub mod caption;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod ports;

#[cfg(test)]
mod test_logs;
