//! Terminal step that uploads the result to an imgur-compatible endpoint.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{LimitsConfig, UploadConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::StepKind;
use crate::types::{WorkData, KEY_IMAGE_URI};

use super::load::ImageLoader;
use super::Worker;

#[derive(Serialize)]
struct UploadRequest {
    image: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    link: String,
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Posts the image as base64 JSON and outputs the returned link.
pub struct UploadWorker {
    client: reqwest::Client,
    endpoint: String,
    client_id: Option<String>,
    timeout_ms: u64,
    loader: ImageLoader,
}

impl UploadWorker {
    pub fn new(config: &UploadConfig, limits: LimitsConfig) -> PipelineResult<Self> {
        let builder = reqwest::Client::builder().timeout(Duration::from_millis(config.timeout_ms));
        Self::with_client(builder, config, limits)
    }

    fn with_client(
        builder: reqwest::ClientBuilder,
        config: &UploadConfig,
        limits: LimitsConfig,
    ) -> PipelineResult<Self> {
        let client = builder.build().map_err(|e| PipelineError::Upload {
            message: format!("Cannot build HTTP client: {e}"),
            status_code: None,
        })?;

        let client_id = resolve_env_var(&config.client_id);
        if client_id.is_none() {
            tracing::debug!("No upload client id configured; sending anonymous requests");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            client_id,
            timeout_ms: config.timeout_ms,
            loader: ImageLoader::new(limits),
        })
    }
}

#[async_trait]
impl Worker for UploadWorker {
    fn name(&self) -> &str {
        "upload"
    }

    async fn do_work(&self, input: &WorkData) -> PipelineResult<WorkData> {
        let source = input.image_uri(StepKind::Upload)?.to_path();
        let bytes = self.loader.read(&source).await?;

        let body = UploadRequest {
            image: BASE64.encode(&bytes),
            kind: "base64",
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref id) = self.client_id {
            request = request.header(AUTHORIZATION, format!("Client-ID {id}"));
        }

        tracing::debug!("Uploading {:?} ({} bytes) to {}", source, bytes.len(), self.endpoint);
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::Timeout {
                    path: source.clone(),
                    stage: "upload".to_string(),
                    timeout_ms: self.timeout_ms,
                }
            } else if e.is_connect() {
                PipelineError::Upload {
                    message: format!("connect failed: {e}"),
                    status_code: None,
                }
            } else {
                PipelineError::Upload {
                    message: e.to_string(),
                    status_code: e.status().map(|s| s.as_u16()),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Upload {
                message: format!("HTTP {}: {}", status.as_u16(), text),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| PipelineError::Upload {
            message: format!("Unexpected upload response: {e}"),
            status_code: None,
        })?;

        tracing::info!("Uploaded {:?} to {}", source, parsed.data.link);
        Ok(WorkData::new().with(KEY_IMAGE_URI, parsed.data.link))
    }
}
