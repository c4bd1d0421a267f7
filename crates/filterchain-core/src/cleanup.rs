//! Idempotent sweep of the scratch directory.
//!
//! Filter steps write their `.png` output into the scratch directory, so
//! files left behind by an aborted run must be gone before a new pipeline
//! produces anything.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of files owned by the pipeline.
pub const SCRATCH_SUFFIX: &str = ".png";

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Files removed, sorted
    pub deleted: Vec<PathBuf>,
    /// Matching entries that could not be removed, sorted
    pub failed: Vec<PathBuf>,
}

/// Delete every entry of `dir` whose name ends with `.png`.
///
/// A missing directory is a no-op. Per-file failures are logged and
/// recorded in the report without stopping the sweep; only a failure to list
/// the directory is returned as an error.
pub fn cleanup_directory(dir: &Path) -> io::Result<CleanupReport> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Nothing to clean, {:?} does not exist", dir);
            return Ok(CleanupReport::default());
        }
        Err(e) => return Err(e),
    };

    let mut report = CleanupReport::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        if !entry.file_name().to_string_lossy().ends_with(SCRATCH_SUFFIX) {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Deleted {:?}", path);
                report.deleted.push(path);
            }
            // Removed by someone else in the meantime: the end state is reached.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Already removed {:?}", path);
            }
            Err(e) => {
                tracing::warn!("Failed to delete {:?}: {}", path, e);
                report.failed.push(path);
            }
        }
    }

    report.deleted.sort();
    report.failed.sort();
    Ok(report)
}
