//! Image filters applied by the filter steps.

mod blur;
mod grayscale;
mod watercolor;

pub use blur::Blur;
pub use grayscale::Grayscale;
pub use watercolor::Watercolor;

use image::DynamicImage;

/// A pure image-to-image transform.
///
/// Implementations must preserve dimensions.
pub trait ImageFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, image: &DynamicImage) -> DynamicImage;
}
