//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the content pipeline and an
//! external system. Implementations live in `src/adapters/`.

pub mod image_generator;
pub mod news_source;
pub mod prompt_generator;
pub mod publisher;

pub use image_generator::{ImageGenerator, ImageLocation};
pub use news_source::{Article, NewsSource};
pub use prompt_generator::PromptGenerator;
pub use publisher::{PublishRequest, Publisher};
