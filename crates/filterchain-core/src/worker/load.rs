//! Image loading with size limits, format detection, and a decode timeout.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Reads and decodes step input images.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    limits: LimitsConfig,
}

impl ImageLoader {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read a file, checking the size limit before loading it.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::io(path, e))
    }

    /// Read and decode an image.
    pub async fn load(&self, path: &Path) -> Result<DynamicImage, PipelineError> {
        let bytes = self.read(path).await?;
        self.decode(bytes, path).await
    }

    /// Decode an in-memory image on the blocking pool, with timeout and
    /// dimension checks.
    pub async fn decode(&self, bytes: Vec<u8>, path: &Path) -> Result<DynamicImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(image))) => {
                let (width, height) = image.dimensions();
                let max_dim = self.limits.max_image_dimension;
                if width > max_dim || height > max_dim {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width,
                        height,
                        max_dim,
                    });
                }
                Ok(image)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

/// Synchronous decode from bytes (runs in spawn_blocking).
///
/// The format is detected from content first, then from the extension.
fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DynamicImage, PipelineError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;

    let reader = match reader.format() {
        Some(_) => reader,
        None => {
            let format = ImageFormat::from_path(path).map_err(|_| PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format".to_string(),
            })?;
            let mut reader = reader;
            reader.set_format(format);
            reader
        }
    };

    reader.decode().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
