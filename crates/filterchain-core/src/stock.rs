//! Procedural stock images for when the user has nothing to pick.

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageUri;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Deterministic gradient images keyed by seed.
pub struct StockImages;

impl StockImages {
    /// Render the image for `seed`. The same seed always gives the same pixels.
    pub fn render(seed: u64) -> RgbaImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let from: [f32; 3] = [rng.gen(), rng.gen(), rng.gen()];
        let to: [f32; 3] = [rng.gen(), rng.gen(), rng.gen()];
        let rings = rng.gen_range(2.0f32..8.0);
        let (cx, cy) = (rng.gen_range(0..WIDTH) as f32, rng.gen_range(0..HEIGHT) as f32);
        let diagonal = ((WIDTH * WIDTH + HEIGHT * HEIGHT) as f32).sqrt();

        RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
            let t = (x + y) as f32 / (WIDTH + HEIGHT) as f32;
            let d = ((x as f32 - cx).hypot(y as f32 - cy) / diagonal * rings * std::f32::consts::TAU)
                .sin()
                * 0.15;
            let channel = |i: usize| {
                let v = from[i] + (to[i] - from[i]) * t + d;
                (v.clamp(0.0, 1.0) * 255.0) as u8
            };
            Rgba([channel(0), channel(1), channel(2), 255])
        })
    }

    /// Write `stock-<seed>.png` into `dir` and return its URI.
    ///
    /// An existing file for the same seed is reused.
    pub fn generate(dir: &Path, seed: u64) -> PipelineResult<ImageUri> {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        let path = dir.join(format!("stock-{seed:016x}.png"));

        if !path.exists() {
            Self::render(seed)
                .save(&path)
                .map_err(|e| PipelineError::Encode {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            tracing::info!("Generated stock image {:?}", path);
        }

        let path = path.canonicalize().map_err(|e| PipelineError::io(&path, e))?;
        Ok(ImageUri::from_path(&path))
    }

    /// Generate a stock image with a random seed.
    pub fn random(dir: &Path) -> PipelineResult<ImageUri> {
        Self::generate(dir, rand::thread_rng().gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(StockImages::render(7), StockImages::render(7));
        assert_ne!(StockImages::render(7), StockImages::render(8));
        assert_eq!(StockImages::render(1).dimensions(), (WIDTH, HEIGHT));
    }

    #[test]
    fn test_generate_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let uri = StockImages::generate(&dir.path().join("stock"), 42).unwrap();

        let path = uri.to_path();
        assert!(uri.as_str().starts_with("file://"));
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "stock-000000000000002a.png"
        );
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), WIDTH);

        let again = StockImages::generate(&dir.path().join("stock"), 42).unwrap();
        assert_eq!(again, uri);
    }

    #[test]
    fn test_random_lands_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let uri = StockImages::random(dir.path()).unwrap();
        assert!(uri.to_path().starts_with(dir.path().canonicalize().unwrap()));
    }
}
