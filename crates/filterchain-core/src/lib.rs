//! Filterchain Core - conditional image-filter work chains.
//!
//! A [`FilterRequest`] describes one image and a set of independent filter
//! flags. The builder turns it into a linear pipeline that always starts by
//! sweeping the scratch directory and always ends by saving or uploading:
//!
//! ```text
//! Cleanup → [Watercolor] → [Grayscale] → [Blur] → SaveToGallery | Upload
//! ```
//!
//! The pipeline is submitted as unique work: a newer request under the same
//! logical name replaces the one in flight.
//!
//! # Usage
//!
//! ```rust,ignore
//! use filterchain_core::{Config, FilterChain, FilterRequest};
//!
//! #[tokio::main]
//! async fn main() -> filterchain_core::Result<()> {
//!     let chain = FilterChain::new(Config::load()?)?;
//!     let request = FilterRequest::new("./cat.jpg").with_blur(true).with_save_locally(true);
//!     let final_state = chain.submit(&request).await?.wait().await;
//!     println!("{final_state:?}");
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod config;
pub mod error;
pub mod executor;
pub mod filters;
pub mod gallery;
pub mod pipeline;
pub mod stock;
pub mod types;
pub mod worker;

pub use cleanup::{cleanup_directory, CleanupReport};
pub use config::Config;
pub use error::{ConfigError, FilterChainError, PipelineError, PipelineResult, Result};
pub use executor::{
    ExistingWorkPolicy, LocalExecutor, RetryPolicy, StepState, WorkExecutor, WorkHandle,
    WorkInfo, WorkState,
};
pub use pipeline::{
    build_pipeline, ImageOperations, Pipeline, PipelineStep, StepKind,
    IMAGE_MANIPULATION_WORK_NAME, TAG_OUTPUT,
};
pub use stock::StockImages;
pub use types::{FilterOptions, FilterRequest, ImageUri, WorkData, KEY_IMAGE_URI};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A configured local executor plus the operations that use its directories.
pub struct FilterChain {
    config: Config,
    executor: LocalExecutor,
}

impl FilterChain {
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing filterchain v{}", VERSION);
        let executor = LocalExecutor::from_config(&config)?;
        Ok(Self { config, executor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &LocalExecutor {
        &self.executor
    }

    /// Build the request's pipeline without submitting it.
    pub fn plan(&self, request: &FilterRequest) -> PipelineResult<ImageOperations> {
        Ok(ImageOperations::new(request)?.with_work_name(&self.config.pipeline.work_name))
    }

    /// Build and enqueue, replacing in-flight work under the configured name.
    pub async fn submit(&self, request: &FilterRequest) -> PipelineResult<WorkHandle> {
        self.plan(request)?.enqueue(&self.executor).await
    }

    /// Sweep the scratch directory outside of any pipeline.
    pub fn cleanup(&self) -> Result<CleanupReport> {
        Ok(cleanup_directory(&self.config.scratch_dir())?)
    }

    /// Images saved to the gallery so far.
    pub fn gallery(&self) -> Vec<std::path::PathBuf> {
        gallery::list_gallery(&self.config.gallery_dir())
    }

    pub fn stock_image(&self, seed: Option<u64>) -> PipelineResult<ImageUri> {
        let dir = self.config.stock_dir();
        match seed {
            Some(seed) => StockImages::generate(&dir, seed),
            None => StockImages::random(&dir),
        }
    }
}
