//! Listing images saved by the gallery step.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The `.png` files directly inside `dir`, sorted. A missing directory is empty.
pub fn list_gallery(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                if e.io_error().map(|io| io.kind()) != Some(std::io::ErrorKind::NotFound) {
                    tracing::warn!("Skipping gallery entry: {}", e);
                }
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".png"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
