/// Image codec adapter
///
/// Everything that moves image bytes between representations:
/// - loading a photo from disk into a data-URL plus its MIME type
/// - splitting a data-URL back into MIME type and base64 payload
///   for the remote call
/// - transcoding the PNG result to JPEG for export
/// - writing exported bytes to disk

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use tokio::task;

use crate::state::session::SourceImage;

/// File extensions offered by the open dialog
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Export format for the restored photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Png,
    Jpeg,
}

impl DownloadFormat {
    /// Suggested filename in the save dialog
    pub fn file_name(self) -> &'static str {
        match self {
            DownloadFormat::Png => "restored_image.png",
            DownloadFormat::Jpeg => "restored_image.jpeg",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("{path} is not a supported image (PNG, JPEG and WEBP are accepted)")]
    Unsupported { path: String },

    #[error("not a valid base64 data URL")]
    MalformedDataUrl,

    #[error("could not convert the image to JPEG: {0}")]
    Transcode(String),

    #[error("could not save {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Load a photo from disk and encode it as a data-URL.
///
/// Runs on a blocking thread because files can be large.
pub async fn load_source(path: PathBuf) -> Result<SourceImage, CodecError> {
    let shown = path.display().to_string();
    task::spawn_blocking(move || load_source_blocking(&path))
        .await
        .map_err(|e| CodecError::Read {
            path: shown,
            reason: format!("task join error: {}", e),
        })?
}

fn load_source_blocking(path: &Path) -> Result<SourceImage, CodecError> {
    let bytes = std::fs::read(path).map_err(|e| CodecError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    // Sniff the type from the leading bytes; the extension is only a fallback
    let mime_type = sniff_mime(&bytes)
        .or_else(|| mime_from_extension(path))
        .filter(|mime| is_supported_mime(mime))
        .ok_or_else(|| CodecError::Unsupported {
            path: path.display().to_string(),
        })?;

    let data_url = to_data_url(&mime_type, &bytes);

    Ok(SourceImage {
        path: path.to_path_buf(),
        mime_type,
        bytes,
        data_url,
    })
}

fn sniff_mime(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

fn mime_from_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png".to_string()),
        "jpg" | "jpeg" => Some("image/jpeg".to_string()),
        "webp" => Some("image/webp".to_string()),
        _ => None,
    }
}

fn is_supported_mime(mime: &str) -> bool {
    matches!(mime, "image/png" | "image/jpeg" | "image/webp")
}

/// Encode raw bytes as a `data:{mime};base64,{payload}` string
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Split a data-URL into its MIME type and raw base64 payload,
/// the form the remote call transmits
pub fn split_data_url(data_url: &str) -> Result<(String, String), CodecError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(CodecError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(CodecError::MalformedDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(CodecError::MalformedDataUrl)?;
    Ok((mime_type.to_string(), payload.to_string()))
}

/// Re-encode PNG bytes as JPEG.
///
/// The model always returns PNG, so JPEG export needs a real transcode.
/// JPEG has no alpha channel, hence the RGB8 conversion.
pub fn png_to_jpeg(png_bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let decoded = image::load_from_memory_with_format(png_bytes, ImageFormat::Png)
        .map_err(|e| CodecError::Transcode(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| CodecError::Transcode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Write the restored photo to disk in the requested format
pub async fn export(
    path: PathBuf,
    png_bytes: Vec<u8>,
    format: DownloadFormat,
) -> Result<PathBuf, CodecError> {
    let bytes = match format {
        DownloadFormat::Png => png_bytes,
        DownloadFormat::Jpeg => png_to_jpeg(&png_bytes)?,
    };

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| CodecError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(path)
}
