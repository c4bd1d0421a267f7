use image::{DynamicImage, RgbaImage};

use super::ImageFilter;

/// Flattens regions with a median filter, posterizes the palette, then
/// softens the edges between colour patches.
#[derive(Debug, Clone, Copy)]
pub struct Watercolor {
    radius: u32,
    levels: u8,
}

impl Watercolor {
    /// `levels` is clamped to at least 2.
    pub fn new(radius: u32, levels: u8) -> Self {
        Self {
            radius,
            levels: levels.max(2),
        }
    }
}

fn posterize(image: &mut RgbaImage, levels: u8) {
    let step = 255.0 / f32::from(levels - 1);
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = ((f32::from(*channel) / step).round() * step).clamp(0.0, 255.0) as u8;
        }
    }
}

impl ImageFilter for Watercolor {
    fn name(&self) -> &'static str {
        "watercolor"
    }

    fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let rgba = image.to_rgba8();
        let mut flattened = imageproc::filter::median_filter(&rgba, self.radius, self.radius);
        posterize(&mut flattened, self.levels);
        DynamicImage::ImageRgba8(image::imageops::blur(&flattened, 0.8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    #[test]
    fn posterize_two_levels_is_binary() {
        let mut img = RgbaImage::from_fn(16, 1, |x, _| {
            let v = (x * 16) as u8;
            Rgba([v, 255 - v, v / 2, 77])
        });
        posterize(&mut img, 2);
        for pixel in img.pixels() {
            assert!(pixel.0[..3].iter().all(|&c| c == 0 || c == 255));
            assert_eq!(pixel.0[3], 77);
        }
    }

    #[test]
    fn median_removes_isolated_speck() {
        let mut img = RgbaImage::from_pixel(7, 7, Rgba([0, 0, 0, 255]));
        img.put_pixel(3, 3, Rgba([255, 255, 255, 255]));

        let out = Watercolor::new(1, 6).apply(&DynamicImage::ImageRgba8(img));

        assert_eq!(out.dimensions(), (7, 7));
        assert!(out.to_rgba8().pixels().all(|p| p.0[0] < 8));
    }

    #[test]
    fn levels_are_clamped() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([120, 10, 240, 255])));
        let out = Watercolor::new(0, 0).apply(&img);
        assert_eq!(out.dimensions(), (3, 3));
    }
}
