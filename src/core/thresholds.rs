use serde::{Deserialize, Serialize};

/// Named tuning constants for the pixel-density classifier.
///
/// The defaults are calibrated for 200-300 DPI scans of boxes drawn with
/// thin printed borders. Templates may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fraction of the box trimmed from each side before counting pixels,
    /// so printed border ink does not register as a mark.
    pub inner_margin: f32,
    /// Densities strictly below this classify as EMPTY.
    pub empty_threshold: f32,
    /// Densities strictly above this classify as CHECKED.
    pub checked_threshold: f32,
    /// Density at which CHECKED confidence saturates at 1.0.
    pub saturation_density: f32,
    /// Grayscale values strictly below this count as dark.
    pub luminance_threshold: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            inner_margin: 0.20,
            empty_threshold: 0.03,
            checked_threshold: 0.12,
            saturation_density: 0.50,
            luminance_threshold: 128,
        }
    }
}

impl ClassifierConfig {
    /// Midpoint of the ambiguous band.
    pub fn band_center(&self) -> f32 {
        (self.empty_threshold + self.checked_threshold) / 2.0
    }

    /// Half-width of the ambiguous band.
    pub fn band_half_range(&self) -> f32 {
        (self.checked_threshold - self.empty_threshold) / 2.0
    }
}
