//! Cleanup step: purges stale `.png` files before new output is produced.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::cleanup::cleanup_directory;
use crate::error::{PipelineError, PipelineResult};
use crate::types::WorkData;

use super::Worker;

/// Clears the scratch directory.
pub struct CleanupWorker {
    target_directory: PathBuf,
}

impl CleanupWorker {
    pub fn new(target_directory: PathBuf) -> Self {
        Self { target_directory }
    }
}

#[async_trait]
impl Worker for CleanupWorker {
    fn name(&self) -> &str {
        "cleanup"
    }

    /// Produces no output, so the next step reads its own image input.
    async fn do_work(&self, _input: &WorkData) -> PipelineResult<WorkData> {
        let dir = self.target_directory.clone();
        let report = tokio::task::spawn_blocking(move || cleanup_directory(&dir))
            .await
            .map_err(|e| PipelineError::Cleanup {
                path: self.target_directory.clone(),
                source: std::io::Error::other(e),
            })?
            .map_err(|source| PipelineError::Cleanup {
                path: self.target_directory.clone(),
                source,
            })?;

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Cleaned {:?}",
            self.target_directory
        );
        Ok(WorkData::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_worker_clears_pngs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stale.png"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"x").unwrap();

        let worker = CleanupWorker::new(dir.path().to_path_buf());
        let output = worker.do_work(&WorkData::new()).await.unwrap();

        assert!(output.is_empty());
        assert!(!dir.path().join("stale.png").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_cleanup_worker_surfaces_listing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("file.txt");
        std::fs::write(&not_a_dir, b"x").unwrap();

        let worker = CleanupWorker::new(not_a_dir);
        let err = worker.do_work(&WorkData::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Cleanup { .. }));
    }
}
