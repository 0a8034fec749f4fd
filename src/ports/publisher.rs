//! Publisher port for social media platforms.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::image_generator::ImageLocation;
use super::news_source::Article;
use crate::error::AdapterError;

/// Everything a publisher needs to post one generated image.
///
/// A single request is built per run and shared by reference with every
/// publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Where the generated image can be fetched.
    pub image: ImageLocation,
    /// The prompt the image was generated from.
    pub prompt: String,
    /// Display name of the image generator.
    pub generator: String,
    /// The article that inspired the image.
    pub article: Article,
}

/// Boxed future type returned by [`Publisher::publish`].
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AdapterError>> + Send + 'a>>;

/// Posts an image with a caption to one social platform.
pub trait Publisher: Send + Sync {
    /// Publish the image described by `request`.
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> PublishFuture<'a>;

    /// Short platform name (e.g. `"x"`), used in logs and cassettes.
    fn name(&self) -> &str;
}
