use image::RgbImage;

use crate::errors::{LeafAreaError, Result};

/// Decode uploaded bytes into an RGB image.
///
/// Anything the `image` crate cannot interpret as a raster image, an empty
/// byte slice included, is reported as `InvalidImage` rather than as a
/// zero-sized image.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|_| LeafAreaError::InvalidImage)?;
    Ok(img.to_rgb8())
}
