//! Source image loading
//!
//! The service accepts the image as a remote URL or an inline data URI.
//! Local files are read and inlined.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;

/// Turns a `--image` argument into a value the service accepts
///
/// `http(s)` URLs and `data:` URIs pass through untouched; anything else is
/// read as a local file.
pub fn load_image(input: &str) -> Result<String> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") || input.starts_with("data:")
    {
        return Ok(input.to_string());
    }

    let path = Path::new(input);
    let mime = mime_type(path)
        .with_context(|| format!("Unsupported image type: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("Image file {} is empty", path.display());
    }

    Ok(to_data_uri(mime, &bytes))
}

fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
