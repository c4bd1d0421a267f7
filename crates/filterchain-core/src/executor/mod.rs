//! Work execution: the executor seam the builder submits to, plus a local
//! tokio implementation.
//!
//! The builder only declares *what* runs and in which order. An executor
//! owns *how*: unique-work replacement, retries, and state reporting.

pub mod local;
pub mod retry;

pub use local::LocalExecutor;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::PipelineResult;
use crate::pipeline::{Pipeline, StepKind};
use crate::types::WorkData;

/// Identifies one submitted pipeline.
pub type WorkId = u64;

/// What to do when work already exists under the same logical name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingWorkPolicy {
    /// Cancel the in-flight pipeline and run the new one
    #[default]
    Replace,
    /// Keep the in-flight pipeline and drop the new submission
    Keep,
}

/// Lifecycle of a submitted pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkState {
    Enqueued,
    Running { step: usize, kind: StepKind },
    Succeeded { output: WorkData },
    Failed {
        step: usize,
        kind: StepKind,
        error: String,
    },
    Cancelled,
}

impl WorkState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            WorkState::Succeeded { .. } | WorkState::Failed { .. } | WorkState::Cancelled
        )
    }
}

/// Lifecycle of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Enqueued,
    Running,
    Succeeded,
    Failed,
    /// An earlier step failed
    Blocked,
    Cancelled,
}

/// Observable snapshot of one step of a submitted pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkInfo {
    pub work_id: WorkId,
    pub name: String,
    pub index: usize,
    pub kind: StepKind,
    pub tags: Vec<String>,
    pub state: StepState,
    pub attempts: u32,
    pub output: WorkData,
}

/// Handle to a submitted pipeline.
#[derive(Debug, Clone)]
pub struct WorkHandle {
    id: WorkId,
    name: String,
    state: watch::Receiver<WorkState>,
}

impl WorkHandle {
    pub(crate) fn new(id: WorkId, name: impl Into<String>, state: watch::Receiver<WorkState>) -> Self {
        Self {
            id,
            name: name.into(),
            state,
        }
    }

    pub fn id(&self) -> WorkId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> WorkState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<WorkState> {
        self.state.clone()
    }

    /// Wait until the pipeline finishes and return its final state.
    ///
    /// If the executor goes away first, returns the last state seen.
    pub async fn wait(&mut self) -> WorkState {
        loop {
            let current = self.state.borrow_and_update().clone();
            if current.is_finished() {
                return current;
            }
            if self.state.changed().await.is_err() {
                return self.state.borrow().clone();
            }
        }
    }
}

/// An engine that runs pipelines under logical names.
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    /// Submit a pipeline as unique work under `name`.
    async fn submit(
        &self,
        name: &str,
        policy: ExistingWorkPolicy,
        pipeline: Pipeline,
    ) -> PipelineResult<WorkHandle>;

    /// Cancel the work under `name`. Returns true if it was still running.
    async fn cancel_unique_work(&self, name: &str) -> bool;
}
