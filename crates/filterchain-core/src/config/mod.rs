//! Configuration management for filterchain.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for filterchain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory locations
    pub general: GeneralConfig,

    /// Pipeline submission and retry settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Filter parameters
    pub filters: FiltersConfig,

    /// Upload target
    pub upload: UploadConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.filterchain.filterchain/config.toml
    /// - Linux: ~/.config/filterchain/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\filterchain\config\config.toml
    ///
    /// Falls back to ~/.filterchain/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "filterchain", "filterchain")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".filterchain").join("config.toml")
            })
    }

    /// Scratch directory shared by cleanup and the filter steps (with ~ and $VAR expansion).
    pub fn scratch_dir(&self) -> PathBuf {
        expand(&self.general.scratch_dir)
    }

    /// Gallery directory written by the save step (with ~ and $VAR expansion).
    pub fn gallery_dir(&self) -> PathBuf {
        expand(&self.general.gallery_dir)
    }

    /// Stock image directory (with ~ and $VAR expansion).
    ///
    /// Kept apart from the scratch directory so cleanup never removes a
    /// pipeline's own input.
    pub fn stock_dir(&self) -> PathBuf {
        expand(&self.general.stock_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand `~` and `$VAR`. An unset variable leaves only `~` expanded.
fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::full(&path_str)
        .unwrap_or_else(|_| shellexpand::tilde(&path_str));
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.work_name, "image_manipulation_work");
        assert_eq!(config.pipeline.retry_attempts, 3);
        assert_eq!(config.limits.max_file_size_mb, 100);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[filters]"));
        assert!(toml.contains("[upload]"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[filters]\nblur_sigma = 2.5\n").unwrap();
        assert_eq!(config.filters.blur_sigma, 2.5);
        assert_eq!(config.filters.watercolor_levels, 6);
        assert_eq!(config.pipeline.retry_delay_ms, 1000);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pipeline]\nwork_name = \"\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("work_name"));
    }

    #[test]
    fn test_directories_are_tilde_expanded() {
        let config = Config::default();
        assert!(!config.scratch_dir().to_string_lossy().starts_with('~'));
        assert_ne!(config.scratch_dir(), config.stock_dir());
    }

    #[test]
    fn test_env_vars_are_expanded() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        let mut config = Config::default();
        config.general.scratch_dir = PathBuf::from("$HOME/.fc/out");
        assert_eq!(config.scratch_dir(), Path::new(&home).join(".fc/out"));
    }
}
