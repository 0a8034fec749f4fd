//! Live adapters that call the real external APIs.

pub mod dalle;
pub mod instagram;
pub mod nytimes;
pub mod openai_chat;
pub mod x;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::caption::truncate_chars;
use crate::error::AdapterError;

const USER_AGENT: &str = concat!("newsgen/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all live adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<Client, AdapterError> {
    Client::builder().timeout(timeout).user_agent(USER_AGENT).build().map_err(AdapterError::from)
}

/// Download a resource and return its bytes.
///
/// # Errors
///
/// Returns an error on network failure or a non-success status.
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, AdapterError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AdapterError::Api {
            status: status.as_u16(),
            message: format!("Failed to download {url}"),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// Check the status of an API response and decode its JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AdapterError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(AdapterError::Api { status: status.as_u16(), message: text });
    }

    serde_json::from_str(&text).map_err(|e| {
        AdapterError::Decode(format!("Failed to parse response: {e}. Body: {}", body_preview(&text)))
    })
}

/// First 500 characters of a response body, for error messages.
pub(crate) fn body_preview(text: &str) -> String {
    let preview = truncate_chars(text, 500);
    if preview.len() < text.len() {
        format!("{preview}...")
    } else {
        preview.into_owned()
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
