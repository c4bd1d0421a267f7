use image::DynamicImage;

use super::ImageFilter;

/// Rec.601 luma, alpha preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl ImageFilter for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let mut rgba = image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
            let y = luma.round().clamp(0.0, 255.0) as u8;
            pixel.0 = [y, y, y, a];
        }
        DynamicImage::ImageRgba8(rgba)
    }
}
