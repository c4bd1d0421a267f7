//! Step workers: the code each pipeline step runs.
//!
//! Every `StepKind` maps to one `Worker` in a `Workers` registry. Executors
//! look workers up by kind, so tests can swap any of them out.

pub mod cleanup;
pub mod filter;
pub mod load;
pub mod save;
pub mod upload;

pub use cleanup::CleanupWorker;
pub use filter::FilterWorker;
pub use load::ImageLoader;
pub use save::SaveToGalleryWorker;
pub use upload::UploadWorker;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::filters::{Blur, Grayscale, Watercolor};
use crate::pipeline::StepKind;
use crate::types::WorkData;

/// A unit of work run for one pipeline step.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry stores `Arc<dyn Worker>`).
#[async_trait]
pub trait Worker: Send + Sync {
    /// Worker name for logging.
    fn name(&self) -> &str;

    /// Run the step on its merged input and return its output data.
    async fn do_work(&self, input: &WorkData) -> PipelineResult<WorkData>;
}

/// Registry mapping each step kind to its worker.
#[derive(Clone, Default)]
pub struct Workers {
    by_kind: HashMap<StepKind, Arc<dyn Worker>>,
}

impl Workers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the standard worker for every step kind.
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        let scratch = config.scratch_dir();
        let limits = &config.limits;
        let filters = &config.filters;

        Ok(Self::new()
            .register(StepKind::Cleanup, Arc::new(CleanupWorker::new(scratch.clone())))
            .register(
                StepKind::Watercolor,
                Arc::new(FilterWorker::new(
                    StepKind::Watercolor,
                    Watercolor::new(filters.watercolor_radius, filters.watercolor_levels),
                    limits.clone(),
                    scratch.clone(),
                )),
            )
            .register(
                StepKind::Grayscale,
                Arc::new(FilterWorker::new(
                    StepKind::Grayscale,
                    Grayscale,
                    limits.clone(),
                    scratch.clone(),
                )),
            )
            .register(
                StepKind::Blur,
                Arc::new(FilterWorker::new(
                    StepKind::Blur,
                    Blur::new(filters.blur_sigma),
                    limits.clone(),
                    scratch,
                )),
            )
            .register(
                StepKind::SaveToGallery,
                Arc::new(SaveToGalleryWorker::new(
                    config.gallery_dir(),
                    limits.clone(),
                )),
            )
            .register(StepKind::Upload, Arc::new(UploadWorker::new(
                &config.upload,
                limits.clone(),
            )?)))
    }

    /// Register (or replace) the worker for `kind`.
    pub fn register(mut self, kind: StepKind, worker: Arc<dyn Worker>) -> Self {
        self.by_kind.insert(kind, worker);
        self
    }

    pub fn get(&self, kind: StepKind) -> PipelineResult<&Arc<dyn Worker>> {
        self.by_kind.get(&kind).ok_or(PipelineError::NoWorker(kind))
    }
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.by_kind.keys().collect();
        kinds.sort();
        f.debug_struct("Workers").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_registers_every_kind() {
        let workers = Workers::from_config(&Config::default()).unwrap();
        for kind in StepKind::ALL {
            assert!(workers.get(kind).is_ok(), "{kind}");
        }
        assert_eq!(workers.get(StepKind::Blur).unwrap().name(), "blur");
    }

    #[test]
    fn test_missing_worker_is_reported() {
        let err = Workers::new().get(StepKind::Upload).err().unwrap();
        assert!(matches!(err, PipelineError::NoWorker(StepKind::Upload)));
    }
}
