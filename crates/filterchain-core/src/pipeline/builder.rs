//! Conditional work-chain builder.

use crate::error::PipelineResult;
use crate::types::{FilterRequest, ImageUri, WorkData, KEY_IMAGE_URI};

use super::step::{OutOfQuotaPolicy, Pipeline, PipelineStep, StepKind};
use super::TAG_OUTPUT;

/// Build the step chain for a request.
///
/// The chain is `Cleanup`, then each enabled filter in the fixed order
/// watercolor, grayscale, blur, then `SaveToGallery` or `Upload`. Fails with
/// `InvalidRequest` when the image reference is empty or malformed.
pub fn build_pipeline(request: &FilterRequest) -> PipelineResult<Pipeline> {
    let image = ImageUri::parse(request.image())?;
    let input = WorkData::new().with(KEY_IMAGE_URI, image.as_str());
    let options = request.options();

    let terminal = if options.save_locally {
        StepKind::SaveToGallery
    } else {
        StepKind::Upload
    };

    let stages = [
        (true, StepKind::Cleanup),
        (options.watercolor, StepKind::Watercolor),
        (options.grayscale, StepKind::Grayscale),
        (options.blur, StepKind::Blur),
        (true, terminal),
    ];

    let steps = stages
        .into_iter()
        .fold(Vec::with_capacity(stages.len()), |mut steps, (apply, kind)| {
            if apply {
                steps.push(step_for(kind, &input));
            }
            steps
        });

    tracing::debug!(image = %image, steps = ?steps.iter().map(|s| s.kind).collect::<Vec<_>>(), "Built pipeline");
    Ok(Pipeline::from_steps(steps))
}

fn step_for(kind: StepKind, input: &WorkData) -> PipelineStep {
    let step = PipelineStep::new(kind, input.clone());
    match kind {
        // Cleanup is plain background work; output steps are tagged for observers.
        StepKind::Cleanup => step,
        k if k.is_terminal() => step
            .expedited(OutOfQuotaPolicy::RunAsNonExpedited)
            .tagged(TAG_OUTPUT),
        _ => step.expedited(OutOfQuotaPolicy::RunAsNonExpedited),
    }
}
