use serde::{Deserialize, Serialize};

/// Checkbox region in page-relative coordinates, each component in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalizedBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl NormalizedBox {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Map to a pixel rectangle on a page of the given dimensions.
    /// Returns `None` when the box collapses to nothing in pixel space.
    pub fn to_pixels(&self, page_width: u32, page_height: u32) -> Option<PixelRect> {
        let left = (self.min_x * page_width as f32).floor() as i64;
        let top = (self.min_y * page_height as f32).floor() as i64;
        let width = (self.width() * page_width as f32).floor() as i64;
        let height = (self.height() * page_height as f32).floor() as i64;

        if width <= 0 || height <= 0 {
            return None;
        }

        Some(PixelRect {
            left,
            top,
            width,
            height,
        })
    }
}

/// Axis-aligned pixel rectangle. Signed components so an off-page box
/// survives until `clamp_to` decides whether anything usable remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    /// Shrink inward by the given fractional margin on each side.
    pub fn shrink(&self, margin: f32) -> PixelRect {
        let margin_x = (self.width as f32 * margin).floor() as i64;
        let margin_y = (self.height as f32 * margin).floor() as i64;
        PixelRect {
            left: self.left + margin_x,
            top: self.top + margin_y,
            width: self.width - 2 * margin_x,
            height: self.height - 2 * margin_y,
        }
    }

    /// Intersect with the page. `None` when no positive-area rectangle
    /// remains inside the image bounds.
    pub fn clamp_to(&self, page_width: u32, page_height: u32) -> Option<PixelRect> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let width = (self.left + self.width).min(page_width as i64) - left;
        let height = (self.top + self.height).min(page_height as i64) - top;

        if width <= 0 || height <= 0 {
            return None;
        }

        Some(PixelRect {
            left,
            top,
            width,
            height,
        })
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) * self.height.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_full_page_box_to_pixels() {
        let rect = NormalizedBox::new(0.0, 1.0, 0.0, 1.0)
            .to_pixels(100, 200)
            .unwrap();
        assert_eq!(
            rect,
            PixelRect {
                left: 0,
                top: 0,
                width: 100,
                height: 200
            }
        );
    }

    #[test]
    fn degenerate_box_maps_to_none() {
        assert_eq!(NormalizedBox::new(0.5, 0.5, 0.1, 0.2).to_pixels(100, 100), None);
        assert_eq!(NormalizedBox::new(0.6, 0.4, 0.1, 0.2).to_pixels(100, 100), None);
    }

    #[test]
    fn shrink_removes_margin_on_each_side() {
        let rect = PixelRect {
            left: 10,
            top: 10,
            width: 100,
            height: 50,
        };
        let inner = rect.shrink(0.2);
        assert_eq!(
            inner,
            PixelRect {
                left: 30,
                top: 20,
                width: 60,
                height: 30
            }
        );
    }

    #[test]
    fn clamp_discards_fully_off_page_rect() {
        let rect = PixelRect {
            left: 150,
            top: 0,
            width: 20,
            height: 20,
        };
        assert_eq!(rect.clamp_to(100, 100), None);
    }

    #[test]
    fn clamp_trims_partially_off_page_rect() {
        let rect = PixelRect {
            left: 90,
            top: -5,
            width: 20,
            height: 20,
        };
        let clamped = rect.clamp_to(100, 100).unwrap();
        assert_eq!(
            clamped,
            PixelRect {
                left: 90,
                top: 0,
                width: 10,
                height: 15
            }
        );
    }
}
