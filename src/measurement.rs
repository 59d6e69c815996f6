use image::{GrayImage, RgbImage};
use serde::Serialize;

use crate::image_utils::{count_nonzero, is_foreground, saturation};
use crate::morphology::fill_holes;

/// Measurement results for a single request.
///
/// `leaf_area` is always present; the remaining keys appear only when the
/// corresponding analyzer ran. All areas are in the square of the unit the
/// caller supplied for length/width.
#[derive(Debug, Clone, Serialize)]
pub struct LeafMeasurements {
    pub leaf_area: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_area_including_fenestrations: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_area_excluding_fenestrations: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variegated_area: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variegation_percent: Option<f64>,
}

impl LeafMeasurements {
    pub fn new(leaf_area: f64) -> Self {
        Self {
            leaf_area,
            leaf_area_including_fenestrations: None,
            leaf_area_excluding_fenestrations: None,
            variegated_area: None,
            variegation_percent: None,
        }
    }
}

/// Leaf area: nonzero mask pixels times the scale factor.
/// A zero scale is degenerate but permitted; it yields zero area.
pub fn measure_area(mask: &GrayImage, scale: f64) -> f64 {
    count_nonzero(mask) as f64 * scale
}

/// Areas including and excluding fenestrations, in that order.
///
/// Takes the mask before hole filling and the already-computed leaf area,
/// which excludes holes by construction and is reported back unchanged for
/// comparison.
pub fn analyze_fenestration(mask: &GrayImage, scale: f64, leaf_area: f64) -> (f64, f64) {
    let filled = fill_holes(mask);
    let area_including = measure_area(&filled, scale);

    (area_including, leaf_area)
}

/// Variegated area and percentage of the leaf it covers.
///
/// A pixel is variegated when its HSV saturation is strictly below
/// `saturation_threshold` and it lies inside the mask. The percentage is
/// defined as 0 for a zero leaf area.
pub fn analyze_variegation(
    image: &RgbImage,
    mask: &GrayImage,
    scale: f64,
    leaf_area: f64,
    saturation_threshold: u8,
) -> (f64, f64) {
    let (width, height) = image.dimensions();

    let mut variegated_count: u64 = 0;
    for y in 0..height {
        for x in 0..width {
            if !is_foreground(mask.get_pixel(x, y)[0]) {
                continue;
            }
            if saturation(image.get_pixel(x, y)) < saturation_threshold {
                variegated_count += 1;
            }
        }
    }

    let variegated_area = variegated_count as f64 * scale;
    let percent = if leaf_area > 0.0 {
        variegated_area / leaf_area * 100.0
    } else {
        0.0
    };

    (variegated_area, percent)
}
