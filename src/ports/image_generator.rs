//! Image generator port for AI image generation APIs.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Retrievable location of a generated image.
///
/// Opaque to the pipeline: it is handed to every publisher untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageLocation(String);

impl ImageLocation {
    /// Wrap a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boxed future type returned by [`ImageGenerator::generate_image`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ImageLocation, AdapterError>> + Send + 'a>>;

/// Generates images from text prompts via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate one image for the given prompt.
    fn generate_image(&self, prompt: &str) -> GenerateFuture<'_>;

    /// Display name of the generator (e.g. `"DALL-E"`), used in captions.
    fn name(&self) -> &str;
}
