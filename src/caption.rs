//! Caption text for publishers, including platform length limits.

use std::borrow::Cow;

use tracing::warn;

use crate::ports::PublishRequest;

/// Maximum post length on X.
pub const X_CAPTION_LIMIT: usize = 280;

/// Maximum caption length on Instagram.
pub const INSTAGRAM_CAPTION_LIMIT: usize = 2200;

/// Cut `text` down to at most `limit` characters.
///
/// Counts Unicode scalar values, so multi-byte characters are never split.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => Cow::Owned(text[..byte_index].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// Fit a caption to a platform limit, logging a warning when it had to be cut.
#[must_use]
pub fn fit_caption(platform: &str, text: &str, limit: usize) -> String {
    let fitted = truncate_chars(text, limit);
    if let Cow::Owned(_) = fitted {
        warn!(
            platform,
            limit,
            original_chars = text.chars().count(),
            "Caption exceeds platform limit, truncating"
        );
    }
    fitted.into_owned()
}

/// Caption for platforms that show the article alongside the image.
#[must_use]
pub fn attributed_caption(request: &PublishRequest) -> String {
    format!(
        "AI Generated Content\n\n{} \n{}\n\nCreated by {} with the prompt:\n\n{}",
        request.article.title, request.article.url, request.generator, request.prompt
    )
}
