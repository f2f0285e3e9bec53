use std::path::Path;

use anyhow::{Context, Result};
use image::GrayImage;

use crate::core::geometry::PixelRect;

/// A decoded page image, held as 8-bit grayscale. Rasterization itself is a
/// collaborator concern; this type only decodes and reads pixels.
#[derive(Debug, Clone)]
pub struct PageRaster {
    gray: GrayImage,
}

impl PageRaster {
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode page image: {}", path.display()))?;
        Ok(Self {
            gray: decoded.into_luma8(),
        })
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray }
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Ratio of pixels inside `rect` darker than `luminance_threshold`.
    /// The rect must already be clamped to the image bounds.
    pub fn dark_ratio(&self, rect: &PixelRect, luminance_threshold: u8) -> f32 {
        let total = rect.area();
        if total <= 0 {
            return 0.0;
        }

        let mut dark: i64 = 0;
        for y in rect.top..rect.top + rect.height {
            for x in rect.left..rect.left + rect.width {
                if self.gray.get_pixel(x as u32, y as u32)[0] < luminance_threshold {
                    dark += 1;
                }
            }
        }
        dark as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_dark_pixels_in_rect() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        for x in 0..5 {
            img.put_pixel(x, 0, Luma([0]));
        }
        let page = PageRaster::from_gray(img);

        let rect = PixelRect {
            left: 0,
            top: 0,
            width: 10,
            height: 1,
        };
        assert_eq!(page.dark_ratio(&rect, 128), 0.5);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let img = GrayImage::from_pixel(4, 4, Luma([128]));
        let page = PageRaster::from_gray(img);
        let rect = PixelRect {
            left: 0,
            top: 0,
            width: 4,
            height: 4,
        };
        // 128 is not darker than the threshold 128
        assert_eq!(page.dark_ratio(&rect, 128), 0.0);
    }
}
