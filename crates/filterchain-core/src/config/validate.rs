//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.work_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.work_name must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.filters.blur_sigma.is_nan() || self.filters.blur_sigma <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filters.blur_sigma must be > 0".into(),
            ));
        }
        if self.filters.watercolor_levels < 2 {
            return Err(ConfigError::ValidationError(
                "filters.watercolor_levels must be >= 2".into(),
            ));
        }
        if self.upload.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "upload.timeout_ms must be > 0".into(),
            ));
        }
        // The cleanup step sweeps the scratch directory before every run.
        let scratch = self.scratch_dir();
        if self.stock_dir() == scratch {
            return Err(ConfigError::ValidationError(
                "general.stock_dir must differ from general.scratch_dir".into(),
            ));
        }
        if self.gallery_dir() == scratch {
            return Err(ConfigError::ValidationError(
                "general.gallery_dir must differ from general.scratch_dir".into(),
            ));
        }
        Ok(())
    }
}
