//! Core data types shared by the builder, the workers and the executor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::StepKind;

/// Work-data key carrying the image a step should read (or has produced).
pub const KEY_IMAGE_URI: &str = "image_uri";

const FILE_SCHEME: &str = "file://";

/// A validated reference to an image: a plain path or a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUri(String);

impl ImageUri {
    /// Parse an image reference, trimming surrounding whitespace.
    ///
    /// Rejects empty references, NUL bytes, schemes other than `file`, and
    /// `file://` with nothing after it.
    pub fn parse(raw: &str) -> PipelineResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "image reference is empty".to_string(),
            ));
        }
        if trimmed.contains('\0') {
            return Err(PipelineError::InvalidRequest(
                "image reference contains a NUL byte".to_string(),
            ));
        }
        if let Some((scheme, rest)) = trimmed.split_once("://") {
            if !scheme.eq_ignore_ascii_case("file") {
                return Err(PipelineError::InvalidRequest(format!(
                    "unsupported scheme '{scheme}' in {trimmed}"
                )));
            }
            if rest.is_empty() {
                return Err(PipelineError::InvalidRequest(format!(
                    "{trimmed} has no path"
                )));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a `file://` URI for a local path.
    pub fn from_path(path: &Path) -> Self {
        Self(format!("{FILE_SCHEME}{}", path.display()))
    }

    /// The local filesystem path this reference points at.
    pub fn to_path(&self) -> PathBuf {
        match self.0.get(..FILE_SCHEME.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(FILE_SCHEME) => {
                PathBuf::from(&self.0[FILE_SCHEME.len()..])
            }
            _ => PathBuf::from(&self.0),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageUri {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImageUri> for String {
    fn from(uri: ImageUri) -> Self {
        uri.0
    }
}

impl std::fmt::Display for ImageUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Independent filter and destination flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub watercolor: bool,
    pub grayscale: bool,
    pub blur: bool,
    /// Save to the gallery instead of uploading
    pub save_locally: bool,
}

/// A request to filter one image. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRequest {
    image: String,
    options: FilterOptions,
}

impl FilterRequest {
    /// Start a request with every flag off.
    ///
    /// The image reference is validated when the pipeline is built.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            options: FilterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_watercolor(mut self, apply: bool) -> Self {
        self.options.watercolor = apply;
        self
    }

    pub fn with_grayscale(mut self, apply: bool) -> Self {
        self.options.grayscale = apply;
        self
    }

    pub fn with_blur(mut self, apply: bool) -> Self {
        self.options.blur = apply;
        self
    }

    pub fn with_save_locally(mut self, save: bool) -> Self {
        self.options.save_locally = save;
        self
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }
}

/// String key/value payload passed into and out of pipeline steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkData(BTreeMap<String, String>);

impl WorkData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay the previous step's output on this step's own input.
    ///
    /// Keys present in `previous` win.
    pub fn merged_with(&self, previous: &WorkData) -> WorkData {
        let mut merged = self.clone();
        for (key, value) in previous.iter() {
            merged.insert(key, value);
        }
        merged
    }

    /// The `image_uri` entry a step needs to run.
    pub fn image_uri(&self, step: StepKind) -> PipelineResult<ImageUri> {
        let raw = self
            .get(KEY_IMAGE_URI)
            .ok_or_else(|| PipelineError::MissingInput {
                step,
                key: KEY_IMAGE_URI.to_string(),
            })?;
        ImageUri::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty_and_blank() {
        assert!(matches!(
            ImageUri::parse(""),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(matches!(
            ImageUri::parse("   \t"),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ImageUri::parse("file://").is_err());
        assert!(ImageUri::parse("https://example.com/cat.png").is_err());
        assert!(ImageUri::parse("a\0b.png").is_err());
    }

    #[test]
    fn test_parse_accepts_paths_and_file_uris() {
        let plain = ImageUri::parse("  photos/cat.jpg ").unwrap();
        assert_eq!(plain.as_str(), "photos/cat.jpg");
        assert_eq!(plain.to_path(), PathBuf::from("photos/cat.jpg"));

        let uri = ImageUri::parse("FILE:///tmp/cat.png").unwrap();
        assert_eq!(uri.to_path(), PathBuf::from("/tmp/cat.png"));
    }

    #[test]
    fn test_from_path_round_trips_to_path() {
        let path = Path::new("/var/scratch/filter-output-1.png");
        let uri = ImageUri::from_path(path);
        assert_eq!(uri.as_str(), "file:///var/scratch/filter-output-1.png");
        assert_eq!(uri.to_path(), path);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<ImageUri>("\"\"");
        assert!(err.is_err());
        let uri: ImageUri = serde_json::from_str("\"/tmp/a.png\"").unwrap();
        assert_eq!(uri.as_str(), "/tmp/a.png");
    }

    #[test]
    fn test_request_builders_are_independent_of_order() {
        let a = FilterRequest::new("a.png").with_blur(true).with_watercolor(true);
        let b = FilterRequest::new("a.png").with_watercolor(true).with_blur(true);
        assert_eq!(a, b);
        assert!(!a.options().grayscale);
        assert!(!a.options().save_locally);
    }

    #[test]
    fn test_merge_prefers_previous_output() {
        let own = WorkData::new()
            .with(KEY_IMAGE_URI, "original.png")
            .with("title", "cat");
        let previous = WorkData::new().with(KEY_IMAGE_URI, "filtered.png");

        let merged = own.merged_with(&previous);
        assert_eq!(merged.get(KEY_IMAGE_URI), Some("filtered.png"));
        assert_eq!(merged.get("title"), Some("cat"));
        assert_eq!(own.merged_with(&WorkData::new()), own);
    }

    #[test]
    fn test_image_uri_missing_key() {
        let err = WorkData::new().image_uri(StepKind::Blur).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingInput {
                step: StepKind::Blur,
                ..
            }
        ));
    }
}
