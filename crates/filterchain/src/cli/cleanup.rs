//! The `filterchain cleanup` command.

use filterchain_core::{cleanup_directory, Config};

/// Sweep the scratch directory and print the report as JSON.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    let dir = config.scratch_dir();
    let report = cleanup_directory(&dir)?;
    tracing::info!(
        "Cleaned {}: {} deleted, {} failed",
        dir.display(),
        report.deleted.len(),
        report.failed.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
