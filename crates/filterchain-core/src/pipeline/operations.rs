//! Building a chain once and submitting it as unique work.

use crate::error::PipelineResult;
use crate::executor::{ExistingWorkPolicy, WorkExecutor, WorkHandle};
use crate::types::FilterRequest;

use super::{build_pipeline, Pipeline, IMAGE_MANIPULATION_WORK_NAME};

/// A built pipeline ready to be enqueued under its logical name.
///
/// Enqueueing always uses [`ExistingWorkPolicy::Replace`]: a newer request
/// supersedes whatever is in flight under the same name.
#[derive(Debug, Clone)]
pub struct ImageOperations {
    pipeline: Pipeline,
    work_name: String,
}

impl ImageOperations {
    /// Validate the request and build its pipeline.
    pub fn new(request: &FilterRequest) -> PipelineResult<Self> {
        Ok(Self {
            pipeline: build_pipeline(request)?,
            work_name: IMAGE_MANIPULATION_WORK_NAME.to_string(),
        })
    }

    pub fn with_work_name(mut self, name: impl Into<String>) -> Self {
        self.work_name = name.into();
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn work_name(&self) -> &str {
        &self.work_name
    }

    /// Submit the pipeline, replacing any work under the same name.
    pub async fn enqueue(self, executor: &dyn WorkExecutor) -> PipelineResult<WorkHandle> {
        tracing::debug!(
            name = %self.work_name,
            steps = self.pipeline.len(),
            "Enqueueing image operations"
        );
        executor
            .submit(&self.work_name, ExistingWorkPolicy::Replace, self.pipeline)
            .await
    }
}
