//! Step and pipeline value types.

use serde::{Deserialize, Serialize};

use crate::types::WorkData;

/// One kind of processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Cleanup,
    Watercolor,
    Grayscale,
    Blur,
    SaveToGallery,
    Upload,
}

impl StepKind {
    /// All kinds, in canonical pipeline order.
    pub const ALL: [StepKind; 6] = [
        StepKind::Cleanup,
        StepKind::Watercolor,
        StepKind::Grayscale,
        StepKind::Blur,
        StepKind::SaveToGallery,
        StepKind::Upload,
    ];

    /// Whether this kind ends a pipeline.
    pub fn is_terminal(self) -> bool {
        matches!(self, StepKind::SaveToGallery | StepKind::Upload)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Cleanup => "cleanup",
            StepKind::Watercolor => "watercolor",
            StepKind::Grayscale => "grayscale",
            StepKind::Blur => "blur",
            StepKind::SaveToGallery => "save_to_gallery",
            StepKind::Upload => "upload",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an executor should do with an expedited step once its quota is spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfQuotaPolicy {
    /// Fall back to running as regular work
    #[default]
    RunAsNonExpedited,
}

/// A single named stage with its input payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub kind: StepKind,

    /// Own input; overlaid by the previous step's output at run time
    pub input: WorkData,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Set when the step is requested as expedited work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expedited: Option<OutOfQuotaPolicy>,
}

impl PipelineStep {
    pub fn new(kind: StepKind, input: WorkData) -> Self {
        Self {
            kind,
            input,
            tags: Vec::new(),
            expedited: None,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn expedited(mut self, policy: OutOfQuotaPolicy) -> Self {
        self.expedited = Some(policy);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// An ordered chain of steps, submitted as one unit of work.
///
/// Only the builder constructs a pipeline, so it always starts with
/// `Cleanup` and ends with exactly one terminal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub(crate) fn from_steps(steps: Vec<PipelineStep>) -> Self {
        debug_assert!(steps.first().map(|s| s.kind) == Some(StepKind::Cleanup));
        debug_assert!(steps.last().is_some_and(|s| s.kind.is_terminal()));
        Self { steps }
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// The step-kind sequence.
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    /// The terminal (save or upload) step.
    pub fn terminal(&self) -> &PipelineStep {
        // Non-empty by construction.
        &self.steps[self.steps.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
