//! Chat-completion port used to write image prompts.

use std::future::Future;
use std::pin::Pin;

use crate::error::AdapterError;

/// Boxed future type returned by [`PromptGenerator::chat`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AdapterError>> + Send + 'a>>;

/// Sends one user message to a large language model and returns its answer.
pub trait PromptGenerator: Send + Sync {
    /// Run a single-turn chat completion.
    fn chat(&self, text: &str) -> ChatFuture<'_>;
}
