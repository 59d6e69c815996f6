use tracing::debug;

use crate::calibration::scale_factor;
use crate::config::Config;
use crate::errors::Result;
use crate::image_io::decode_image;
use crate::image_utils::count_nonzero;
use crate::measurement::{
    analyze_fenestration, analyze_variegation, measure_area, LeafMeasurements,
};
use crate::segmentation::segment_leaf;

/// Validated parameters for a single measurement
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest {
    /// Real-world dimension spanned by the mask's bounding-box height
    pub length: f64,
    /// Real-world dimension spanned by the mask's bounding-box width
    pub width: f64,
    pub fenestrated: bool,
    pub variegated: bool,
}

/// Run the full measurement pipeline on uploaded image bytes.
///
/// Decode, segment, calibrate and estimate area, then run the optional
/// analyzers. Everything is request-local; nothing survives the call.
pub fn process_image(
    bytes: &[u8],
    request: &MeasureRequest,
    config: &Config,
) -> Result<LeafMeasurements> {
    // Step 1: Decode the upload
    let image = decode_image(bytes)?;
    let (img_width, img_height) = image.dimensions();
    debug!(width = img_width, height = img_height, "image decoded");

    // Step 2: Segment the leaf and clean up the mask
    let mask = segment_leaf(&image, config);
    debug!(foreground_pixels = count_nonzero(&mask), "leaf segmented");

    // Step 3: Calibrate against the reference dimensions
    let scale = scale_factor(&mask, request.length, request.width)?;
    debug!(scale, "scale factor derived");

    // Step 4: Estimate the leaf area
    let leaf_area = measure_area(&mask, scale);
    let mut result = LeafMeasurements::new(leaf_area);

    // Step 5: Optional fenestration analysis on the pre-fill mask
    if request.fenestrated {
        let (including, excluding) = analyze_fenestration(&mask, scale, leaf_area);
        debug!(including, excluding, "fenestration analyzed");
        result.leaf_area_including_fenestrations = Some(including);
        result.leaf_area_excluding_fenestrations = Some(excluding);
    }

    // Step 6: Optional variegation analysis
    if request.variegated {
        let (variegated_area, percent) = analyze_variegation(
            &image,
            &mask,
            scale,
            leaf_area,
            config.saturation_threshold,
        );
        debug!(variegated_area, percent, "variegation analyzed");
        result.variegated_area = Some(variegated_area);
        result.variegation_percent = Some(percent);
    }

    Ok(result)
}
