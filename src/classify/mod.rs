use tracing::debug;

use crate::core::geometry::NormalizedBox;
use crate::core::model::{CheckboxState, Classification};
use crate::core::thresholds::ClassifierConfig;
use crate::raster::PageRaster;

/// Classify one checkbox region on a decoded page.
///
/// Never returns an error: degenerate geometry and out-of-bounds crops
/// collapse to `Classification::degraded()`.
pub fn classify_region(
    page: &PageRaster,
    region: &NormalizedBox,
    config: &ClassifierConfig,
) -> Classification {
    let Some(rect) = region.to_pixels(page.width(), page.height()) else {
        return Classification::degraded();
    };

    let inner = rect.shrink(config.inner_margin);
    let Some(inner) = inner.clamp_to(page.width(), page.height()) else {
        return Classification::degraded();
    };
    if inner.width <= 0 || inner.height <= 0 {
        return Classification::degraded();
    }

    let density = page.dark_ratio(&inner, config.luminance_threshold);
    let classification = classify_density(density, config);
    debug!(
        density,
        state = ?classification.state,
        confidence = classification.confidence,
        "classified checkbox region"
    );
    classification
}

/// Map a dark-pixel density to a state and confidence. Both threshold
/// comparisons are strict; densities exactly on a threshold stay ambiguous.
pub fn classify_density(density: f32, config: &ClassifierConfig) -> Classification {
    if density < config.empty_threshold {
        Classification {
            state: CheckboxState::Empty,
            pixel_density: density,
            confidence: 1.0 - density / config.empty_threshold,
        }
    } else if density > config.checked_threshold {
        let rise = (density - config.checked_threshold)
            / (config.saturation_density - config.checked_threshold);
        Classification {
            state: CheckboxState::Checked,
            pixel_density: density,
            confidence: rise.min(1.0),
        }
    } else {
        // Mid-band: genuinely uncertain, confidence capped at 0.5 and lowest
        // at the center of the band.
        let offset = (density - config.band_center()).abs();
        Classification {
            state: CheckboxState::Ambiguous,
            pixel_density: density,
            confidence: offset / config.band_half_range() * 0.5,
        }
    }
}
