//! Terminal step that stores the result in the local gallery.

use async_trait::async_trait;
use image::ImageFormat;
use std::io::Cursor;
use std::path::PathBuf;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::StepKind;
use crate::types::{ImageUri, WorkData, KEY_IMAGE_URI};

use super::load::ImageLoader;
use super::Worker;

/// Saves the final image to the gallery directory as PNG.
///
/// Files are named by content hash, so saving the same result twice leaves
/// one gallery entry.
pub struct SaveToGalleryWorker {
    gallery_dir: PathBuf,
    loader: ImageLoader,
}

impl SaveToGalleryWorker {
    pub fn new(gallery_dir: PathBuf, limits: LimitsConfig) -> Self {
        Self {
            gallery_dir,
            loader: ImageLoader::new(limits),
        }
    }

    /// Input bytes as PNG, re-encoding other formats.
    async fn png_bytes(&self, bytes: Vec<u8>, source: &std::path::Path) -> PipelineResult<Vec<u8>> {
        if matches!(image::guess_format(&bytes), Ok(ImageFormat::Png)) {
            return Ok(bytes);
        }

        let image = self.loader.decode(bytes, source).await?;
        let source = source.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut buffer = Cursor::new(Vec::new());
            image
                .write_to(&mut buffer, ImageFormat::Png)
                .map_err(|e| PipelineError::Encode {
                    path: source.clone(),
                    message: e.to_string(),
                })?;
            Ok(buffer.into_inner())
        })
        .await
        .map_err(|e| PipelineError::Encode {
            path: self.gallery_dir.clone(),
            message: format!("Task join error: {}", e),
        })?
    }
}

#[async_trait]
impl Worker for SaveToGalleryWorker {
    fn name(&self) -> &str {
        "save_to_gallery"
    }

    async fn do_work(&self, input: &WorkData) -> PipelineResult<WorkData> {
        let source = input.image_uri(StepKind::SaveToGallery)?.to_path();
        let bytes = self.loader.read(&source).await?;
        let png = self.png_bytes(bytes, &source).await?;

        let hash = blake3::hash(&png).to_hex();
        let target = self.gallery_dir.join(format!("filtered-{}.png", &hash[..16]));

        tokio::fs::create_dir_all(&self.gallery_dir)
            .await
            .map_err(|e| PipelineError::io(&self.gallery_dir, e))?;

        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tracing::debug!("Already in gallery: {:?}", target);
        } else {
            tokio::fs::write(&target, &png)
                .await
                .map_err(|e| PipelineError::io(&target, e))?;
            tracing::info!("Saved {:?} to gallery", target);
        }

        let target = tokio::fs::canonicalize(&target)
            .await
            .map_err(|e| PipelineError::io(&target, e))?;
        Ok(WorkData::new().with(KEY_IMAGE_URI, ImageUri::from_path(&target).as_str()))
    }
}
