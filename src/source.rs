/// Image sources and inline payloads
///
/// Decodes pictures from files, raw bytes or `data:` URIs, and encodes
/// composites back into `data:image/png;base64,...` strings for the gallery.

use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

use crate::error::{CoverError, CoverResult};

/// MIME type guessed from the file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Whether a MIME type names an image
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Decode an encoded image (PNG, JPEG, ...)
pub fn decode_bytes(bytes: &[u8]) -> CoverResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Decode a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> CoverResult<DynamicImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CoverError::data_uri("missing data: prefix"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoverError::data_uri("missing payload separator"))?;

    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default();
    if !mime.is_empty() && !is_image_mime(mime) {
        return Err(CoverError::UnsupportedMedia(mime.to_string()));
    }
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(CoverError::data_uri("only base64 payloads are supported"));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CoverError::data_uri(e.to_string()))?;
    decode_bytes(&bytes)
}

/// An in-memory picture to open in the editor
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// Encoded file contents
    Bytes(&'a [u8]),
    /// `data:image/...;base64,...`
    DataUri(&'a str),
}

impl ImageSource<'_> {
    pub fn decode(self) -> CoverResult<DynamicImage> {
        match self {
            ImageSource::Bytes(bytes) => decode_bytes(bytes),
            ImageSource::DataUri(uri) => decode_data_uri(uri),
        }
    }
}

/// Load an image file
///
/// Decoding is CPU-bound, so it runs on the blocking pool.
pub async fn load_path(path: PathBuf) -> CoverResult<DynamicImage> {
    if let Some(mime) = mime_for_path(&path) {
        if !is_image_mime(mime) {
            return Err(CoverError::UnsupportedMedia(mime.to_string()));
        }
    }

    let bytes = tokio::fs::read(&path).await?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    task::spawn_blocking(move || decode_bytes(&bytes)).await?
}

/// Encode a bitmap as a PNG data URI
pub fn encode_data_uri(image: &RgbaImage) -> CoverResult<String> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png.into_inner())
    ))
}

/// Size of an image scaled down to fit inside `max_width` x `max_height`.
/// Smaller images keep their size.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Scale an image to fit the canvas limits, preserving aspect ratio
pub fn fit_to_canvas(image: &DynamicImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (w, h) = fit_dimensions(image.width(), image.height(), max_width, max_height);
    if (w, h) == (image.width(), image.height()) {
        image.to_rgba8()
    } else {
        image.resize_exact(w, h, FilterType::Triangle).to_rgba8()
    }
}
