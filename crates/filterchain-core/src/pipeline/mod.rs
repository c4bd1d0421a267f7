//! The work-chain: step definitions, the conditional builder, and the
//! `ImageOperations` handle that submits a chain to an executor.
//!
//! ```text
//! Cleanup → [Watercolor] → [Grayscale] → [Blur] → SaveToGallery | Upload
//! ```

pub mod builder;
pub mod operations;
pub mod step;

pub use builder::build_pipeline;
pub use operations::ImageOperations;
pub use step::{OutOfQuotaPolicy, Pipeline, PipelineStep, StepKind};

/// Logical name every filter pipeline is submitted under.
pub const IMAGE_MANIPULATION_WORK_NAME: &str = "image_manipulation_work";

/// Tag carried by the terminal step so observers can find the final output.
pub const TAG_OUTPUT: &str = "OUTPUT";
