use image::DynamicImage;

use super::ImageFilter;

/// Gaussian blur.
#[derive(Debug, Clone, Copy)]
pub struct Blur {
    sigma: f32,
}

impl Blur {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl ImageFilter for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn apply(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageRgba8(image::imageops::blur(&image.to_rgba8(), self.sigma))
    }
}
