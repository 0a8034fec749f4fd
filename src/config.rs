//! Configuration file loading with environment variable overrides.
//!
//! The environment is read exactly once, in [`Config::resolve`]. Adapters
//! receive their credentials from the resulting struct.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AdapterError;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Service credentials.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Image generation settings.
    #[serde(default)]
    pub image: ImageConfig,

    /// Which publishers to post to.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Base URLs of the external services.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Service credentials.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// New York Times API key.
    pub nytimes: Option<String>,
    /// `OpenAI` API key, used for both chat and images.
    pub openai: Option<String>,
    /// X user access token (OAuth 2.0, `tweet.write` and `media.write` scopes).
    pub x_token: Option<String>,
    /// Instagram Graph API access token.
    pub instagram_token: Option<String>,
    /// Instagram business account id.
    pub instagram_user_id: Option<String>,
}

/// Language model settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completion model.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self { model: "gpt-4o".to_string(), temperature: 0.9 }
    }
}

/// Image generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Image model.
    pub model: String,
    /// Requested pixel size, e.g. `"1024x1024"`.
    pub size: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { model: "dall-e-3".to_string(), size: "1024x1024".to_string() }
    }
}

/// Publisher selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Publisher names, any of `"x"` and `"instagram"`.
    pub publishers: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self { publishers: vec!["x".to_string(), "instagram".to_string()] }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl HttpConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Base URLs of the external services.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// New York Times API.
    pub nytimes: String,
    /// `OpenAI` API.
    pub openai: String,
    /// X API.
    pub x: String,
    /// Facebook Graph API, which serves Instagram publishing.
    pub instagram: String,
    /// Graph API version segment, e.g. `"v21.0"`.
    pub instagram_api_version: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            nytimes: "https://api.nytimes.com".to_string(),
            openai: "https://api.openai.com".to_string(),
            x: "https://api.x.com".to_string(),
            instagram: "https://graph.facebook.com".to_string(),
            instagram_api_version: "v21.0".to_string(),
        }
    }
}

/// Environment variables that override `[keys]` entries.
pub const NYTIMES_KEY_VAR: &str = "NEW_YORK_TIMES_KEY";
/// See [`NYTIMES_KEY_VAR`].
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
/// See [`NYTIMES_KEY_VAR`].
pub const X_TOKEN_VAR: &str = "X_ACCESS_TOKEN";
/// See [`NYTIMES_KEY_VAR`].
pub const INSTAGRAM_TOKEN_VAR: &str = "INSTAGRAM_ACCESS_TOKEN";
/// See [`NYTIMES_KEY_VAR`].
pub const INSTAGRAM_USER_VAR: &str = "INSTAGRAM_USER_ID";

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Load the file and apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn resolve(path: &Path) -> Result<Self, String> {
        let mut config = Self::load(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override credentials with values from `lookup`, which maps an
    /// environment variable name to its value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let keys = &mut self.keys;
        for (var, slot) in [
            (NYTIMES_KEY_VAR, &mut keys.nytimes),
            (OPENAI_KEY_VAR, &mut keys.openai),
            (X_TOKEN_VAR, &mut keys.x_token),
            (INSTAGRAM_TOKEN_VAR, &mut keys.instagram_token),
            (INSTAGRAM_USER_VAR, &mut keys.instagram_user_id),
        ] {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
    }

    /// The New York Times API key.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] when unset.
    pub fn nytimes_key(&self) -> Result<String, AdapterError> {
        require(self.keys.nytimes.as_ref(), "New York Times", NYTIMES_KEY_VAR)
    }

    /// The `OpenAI` API key.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] when unset.
    pub fn openai_key(&self) -> Result<String, AdapterError> {
        require(self.keys.openai.as_ref(), "OpenAI", OPENAI_KEY_VAR)
    }

    /// The X user access token.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] when unset.
    pub fn x_token(&self) -> Result<String, AdapterError> {
        require(self.keys.x_token.as_ref(), "X", X_TOKEN_VAR)
    }

    /// The Instagram access token and account id.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] when either is unset.
    pub fn instagram_credentials(&self) -> Result<(String, String), AdapterError> {
        Ok((
            require(self.keys.instagram_token.as_ref(), "Instagram", INSTAGRAM_TOKEN_VAR)?,
            require(self.keys.instagram_user_id.as_ref(), "Instagram", INSTAGRAM_USER_VAR)?,
        ))
    }
}

fn require(value: Option<&String>, provider: &str, env_var: &str) -> Result<String, AdapterError> {
    value.cloned().ok_or_else(|| AdapterError::MissingApiKey {
        provider: provider.to_string(),
        env_var: env_var.to_string(),
    })
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `NEWSGEN_CONFIG` environment variable
/// 3. `~/.config/newsgen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("NEWSGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/newsgen/config.toml")
    } else {
        PathBuf::from("newsgen.toml")
    }
}
