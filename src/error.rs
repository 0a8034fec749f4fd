//! Error types for adapters and the content pipeline.

use thiserror::Error;

/// Errors raised by a single adapter call (news, LLM, image, publisher).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or body from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// A replayed interaction was an error, or the cassette could not serve one.
    #[error("Replay error: {0}")]
    Replay(String),

    /// The call was abandoned because the run was cancelled.
    #[error("cancelled before completion")]
    Cancelled,

    /// No credential configured for a service.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The service name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

/// Errors that end a content generation run.
///
/// Publish failures never end a run. They are logged per publisher and
/// reported in the run summary instead.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The news source could not produce a main article.
    #[error("failed to fetch main article: {0}")]
    UpstreamFetch(#[source] AdapterError),

    /// The language model could not produce an image prompt.
    #[error("failed to generate image prompt: {0}")]
    PromptGeneration(#[source] AdapterError),

    /// The image generator could not produce an image.
    #[error("failed to generate image: {0}")]
    ImageGeneration(#[source] AdapterError),

    /// The caller cancelled the run, or its deadline passed.
    #[error("run cancelled")]
    Cancelled,
}

impl ContentError {
    /// The adapter error behind this failure, if any.
    #[must_use]
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            Self::UpstreamFetch(e) | Self::PromptGeneration(e) | Self::ImageGeneration(e) => {
                Some(e)
            }
            Self::Cancelled => None,
        }
    }
}

/// Errors surfaced by the binaries.
#[derive(Debug, Error)]
pub enum AppError {
    /// Setting up adapters, reading input, or saving output failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The content run failed.
    #[error(transparent)]
    Content(#[from] ContentError),
}
