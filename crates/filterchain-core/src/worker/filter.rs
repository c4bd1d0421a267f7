//! Generic filter step: decode the input, apply one filter, write a PNG
//! into the scratch directory.

use async_trait::async_trait;
use image::ImageFormat;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::filters::ImageFilter;
use crate::pipeline::StepKind;
use crate::types::{ImageUri, WorkData, KEY_IMAGE_URI};

use super::load::ImageLoader;
use super::Worker;

/// Runs an `ImageFilter` as a pipeline step.
pub struct FilterWorker<F> {
    kind: StepKind,
    filter: Arc<F>,
    loader: ImageLoader,
    scratch_dir: PathBuf,
}

impl<F: ImageFilter + 'static> FilterWorker<F> {
    pub fn new(kind: StepKind, filter: F, limits: LimitsConfig, scratch_dir: PathBuf) -> Self {
        Self {
            kind,
            filter: Arc::new(filter),
            loader: ImageLoader::new(limits),
            scratch_dir,
        }
    }
}

/// A fresh `filter-output-<hex>.png` name.
pub(crate) fn output_file_name() -> String {
    format!("filter-output-{:016x}.png", rand::random::<u64>())
}

#[async_trait]
impl<F: ImageFilter + 'static> Worker for FilterWorker<F> {
    fn name(&self) -> &str {
        self.filter.name()
    }

    async fn do_work(&self, input: &WorkData) -> PipelineResult<WorkData> {
        let source = input.image_uri(self.kind)?.to_path();
        let image = self.loader.load(&source).await?;

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| PipelineError::io(&self.scratch_dir, e))?;
        let scratch = tokio::fs::canonicalize(&self.scratch_dir)
            .await
            .map_err(|e| PipelineError::io(&self.scratch_dir, e))?;
        let output_path = scratch.join(output_file_name());

        let filter = Arc::clone(&self.filter);
        let target = output_path.clone();
        tokio::task::spawn_blocking(move || {
            let filtered = filter.apply(&image);
            filtered
                .save_with_format(&target, ImageFormat::Png)
                .map_err(|e| PipelineError::Encode {
                    path: target.clone(),
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| PipelineError::Encode {
            path: output_path.clone(),
            message: format!("Task join error: {}", e),
        })??;

        tracing::info!(
            filter = self.filter.name(),
            "Wrote {:?} from {:?}",
            output_path,
            source
        );
        Ok(WorkData::new().with(KEY_IMAGE_URI, ImageUri::from_path(&output_path).as_str()))
    }
}
