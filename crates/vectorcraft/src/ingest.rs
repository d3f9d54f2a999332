//! File ingestion: raw upload bytes into an in-memory image handle.
//!
//! Every input surface (picker, drop, programmatic) is normalized into a
//! single `acquire` call; the result is exactly one `ImageAcquired` event or
//! an ingest error. Decoding runs off the async thread with a timeout.

use base64::Engine;
use image::GenericImageView;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::IngestError;

/// A raw file handed in by some input surface.
#[derive(Debug, Clone)]
pub struct RawFile {
    /// Original file name, used only for messages
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Opaque in-memory handle to an acquired raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Base64-encoded image bytes
    data: String,
    /// MIME type (e.g., "image/png")
    media_type: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl ImageHandle {
    /// Return a data URL carrying the full image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// MIME type of the underlying bytes.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

/// The single "image acquired" event.
#[derive(Debug, Clone)]
pub struct ImageAcquired {
    pub image: ImageHandle,
    /// Original file size in bytes, for status display
    pub byte_size: u64,
}

/// Normalizes uploads into image handles, enforcing resource limits.
pub struct Ingestor {
    limits: LimitsConfig,
}

impl Ingestor {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an uploaded file into an image handle.
    ///
    /// An absent file is a no-op (`Ok(None)`), not an error; input surfaces
    /// forward drop/change events without checking them first.
    pub async fn acquire(&self, file: Option<RawFile>) -> Result<Option<ImageAcquired>, IngestError> {
        let Some(file) = file else {
            return Ok(None);
        };

        let byte_size = file.bytes.len() as u64;
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if byte_size > max_bytes {
            return Err(IngestError::FileTooLarge {
                name: file.name,
                size_mb: byte_size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let name = file.name.clone();
        let decoded = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || Self::decode_sync(file)),
        )
        .await;

        match decoded {
            Ok(Ok(result)) => {
                let handle = result?;
                tracing::debug!(
                    "Acquired image ({}x{}, {} KB)",
                    handle.width,
                    handle.height,
                    byte_size / 1024
                );
                Ok(Some(ImageAcquired {
                    image: handle,
                    byte_size,
                }))
            }
            Ok(Err(e)) => Err(IngestError::DecodeFailed {
                name,
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(IngestError::Timeout {
                name,
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_sync(file: RawFile) -> Result<ImageHandle, IngestError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(&file.bytes))
            .with_guessed_format()
            .map_err(|e| IngestError::DecodeFailed {
                name: file.name.clone(),
                message: format!("Cannot detect image format: {e}"),
            })?;

        let format = reader.format();
        let image = reader.decode().map_err(|e| IngestError::DecodeFailed {
            name: file.name.clone(),
            message: e.to_string(),
        })?;
        let (width, height) = image.dimensions();

        Ok(ImageHandle {
            data: base64::engine::general_purpose::STANDARD.encode(&file.bytes),
            media_type: format.and_then(format_to_media_type).unwrap_or("image/png").to_string(),
            width,
            height,
        })
    }
}

#[cfg(test)]
impl ImageHandle {
    /// A small fixed handle for state-machine tests.
    pub(crate) fn for_tests() -> Self {
        Self {
            data: "iVBORw0KGgo".to_string(),
            media_type: "image/png".to_string(),
            width: 4,
            height: 4,
        }
    }
}

/// Map a detected image format to its MIME type.
fn format_to_media_type(format: image::ImageFormat) -> Option<&'static str> {
    use image::ImageFormat;
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}
