//! The `filterchain run` command: build, enqueue, and follow one pipeline.

use clap::Args;
use filterchain_core::{
    Config, FilterChain, FilterRequest, StepKind, WorkHandle, WorkState, KEY_IMAGE_URI,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Image and filter flags shared by `run` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Image path or file:// URI
    pub image: String,

    /// Apply the watercolor filter
    #[arg(long)]
    pub watercolor: bool,

    /// Convert to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Apply a gaussian blur
    #[arg(long)]
    pub blur: bool,

    /// Save to the local gallery instead of uploading
    #[arg(long)]
    pub save: bool,
}

impl FilterArgs {
    pub fn to_request(&self) -> FilterRequest {
        FilterRequest::new(self.image.as_str())
            .with_watercolor(self.watercolor)
            .with_grayscale(self.grayscale)
            .with_blur(self.blur)
            .with_save_locally(self.save)
    }
}

/// What `run` prints on success.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub work_id: u64,
    pub name: String,
    pub image_uri: Option<String>,
    pub steps: Vec<StepKind>,
}

/// Execute the run command.
pub async fn execute(args: FilterArgs, config: Config) -> anyhow::Result<()> {
    let chain = FilterChain::new(config)?;
    let summary = run_request(&chain, &args.to_request()).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Submit a request and follow it with a spinner until it finishes.
pub async fn run_request(chain: &FilterChain, request: &FilterRequest) -> anyhow::Result<RunSummary> {
    let ops = chain.plan(request)?;
    let steps = ops.pipeline().kinds();
    let handle = ops.enqueue(chain.executor()).await?;
    let total = steps.len();

    let spinner = create_spinner()?;
    let state = follow(handle.clone(), &spinner, total).await;
    spinner.finish_and_clear();

    match state {
        WorkState::Succeeded { output } => Ok(RunSummary {
            work_id: handle.id(),
            name: handle.name().to_string(),
            image_uri: output.get(KEY_IMAGE_URI).map(str::to_string),
            steps,
        }),
        WorkState::Failed { kind, error, .. } => {
            anyhow::bail!("{kind} step failed: {error}")
        }
        WorkState::Cancelled => anyhow::bail!("Work '{}' was cancelled", handle.name()),
        other => anyhow::bail!("Work '{}' stopped in state {other:?}", handle.name()),
    }
}

async fn follow(handle: WorkHandle, spinner: &ProgressBar, total: usize) -> WorkState {
    let mut updates = handle.subscribe();
    loop {
        let current = updates.borrow_and_update().clone();
        if let WorkState::Running { step, kind } = &current {
            spinner.set_message(format!("[{}/{}] {}", step + 1, total, kind));
        }
        if current.is_finished() || updates.changed().await.is_err() {
            return updates.borrow().clone();
        }
    }
}

fn create_spinner() -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    spinner.set_message("enqueued");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
