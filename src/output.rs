//! File naming, image saving, and format conversion for downloaded images.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AdapterError;

/// Format used when neither `--format` nor the output path names one.
pub const DEFAULT_FORMAT: &str = "png";

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: jpeg, png, webp")),
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "png" => "png",
        "webp" => "webp",
        // jpeg and any unknown format default to jpg
        _ => "jpg",
    }
}

/// Pick the output format: the explicit flag, else the output file's
/// extension, else [`DEFAULT_FORMAT`].
#[must_use]
pub fn resolve_format(explicit: Option<&str>, output: Option<&str>) -> String {
    if let Some(format) = explicit {
        return format.to_string();
    }
    let from_extension = output
        .and_then(|p| Path::new(p).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| match ext.as_str() {
            "jpg" | "jpeg" => Some("jpeg"),
            "png" => Some("png"),
            "webp" => Some("webp"),
            _ => None,
        });
    from_extension.unwrap_or(DEFAULT_FORMAT).to_string()
}

/// Generate an output filename from a prompt and format.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case,
/// appends a unix timestamp, and adds the appropriate file extension.
#[must_use]
pub fn auto_filename(prompt: &str, format: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let ext = format_extension(format);
    format!("{sanitized}-{timestamp}.{ext}")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Save downloaded image bytes to a file, converting format if necessary.
///
/// The source format is sniffed from the bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be written or format conversion fails.
pub fn save_image(data: &[u8], target_format: &str, output_path: &Path) -> Result<(), AdapterError> {
    let source_mime = image::guess_format(data).map_or("application/octet-stream", |f| f.to_mime_type());

    if mime_matches_format(source_mime, target_format) {
        std::fs::write(output_path, data).map_err(AdapterError::Io)
    } else {
        convert_and_save(data, target_format, output_path)
    }
}

/// Check if a MIME type matches the requested output format.
fn mime_matches_format(mime: &str, format: &str) -> bool {
    matches!((mime, format), ("image/jpeg", "jpeg") | ("image/png", "png") | ("image/webp", "webp"))
}

fn convert_and_save(data: &[u8], target_format: &str, output_path: &Path) -> Result<(), AdapterError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AdapterError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(AdapterError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    // JPEG has no alpha channel.
    let img = if image_format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(output_path, image_format).map_err(|e| {
        AdapterError::ImageConversion(format!("Failed to save as {target_format}: {e}"))
    })
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str, format: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(prompt, format)),
    }
}
