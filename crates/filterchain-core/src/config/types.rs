//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Scratch directory for intermediate `.png` files
    pub scratch_dir: PathBuf,

    /// Where the save step writes finished images
    pub gallery_dir: PathBuf,

    /// Where generated stock images are written
    pub stock_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("~/.filterchain/outputs"),
            gallery_dir: PathBuf::from("~/.filterchain/gallery"),
            stock_dir: PathBuf::from("~/.filterchain/stock"),
        }
    }
}

/// Pipeline submission and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Logical name used for unique-work replacement
    pub work_name: String,

    /// Max retry attempts for transient step failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_name: crate::pipeline::IMAGE_MANIPULATION_WORK_NAME.to_string(),
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Filter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Gaussian sigma for the blur step
    pub blur_sigma: f32,

    /// Median filter radius for the watercolor step
    pub watercolor_radius: u32,

    /// Posterize levels per channel for the watercolor step
    pub watercolor_levels: u8,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 8.0,
            watercolor_radius: 3,
            watercolor_levels: 6,
        }
    }
}

/// Upload target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint accepting a JSON `{"image": <base64>, "type": "base64"}` body
    pub endpoint: String,

    /// Client id sent as `Authorization: Client-ID <id>`; supports `${ENV_VAR}`
    pub client_id: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.imgur.com/3/image".to_string(),
            client_id: "${IMGUR_CLIENT_ID}".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty or json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
