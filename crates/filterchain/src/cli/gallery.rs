//! The `filterchain gallery` command.

use filterchain_core::gallery::list_gallery;
use filterchain_core::Config;

/// Print one saved image path per line.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    let dir = config.gallery_dir();
    let images = list_gallery(&dir);
    if images.is_empty() {
        eprintln!("No saved images in {}", dir.display());
    }
    for path in images {
        println!("{}", path.display());
    }
    Ok(())
}
