use image::GrayImage;

use crate::errors::{LeafAreaError, Result};
use crate::image_utils::is_foreground;

/// Tightest axis-aligned rectangle enclosing all nonzero mask pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Find the bounding box of all nonzero mask pixels.
/// Returns None when the mask is entirely zero.
pub fn bounding_box(mask: &GrayImage) -> Option<BoundingBox> {
    let (img_width, img_height) = mask.dimensions();

    let mut min_x = img_width;
    let mut max_x = 0;
    let mut min_y = img_height;
    let mut max_y = 0;
    let mut found_pixels = false;

    for y in 0..img_height {
        for x in 0..img_width {
            if is_foreground(mask.get_pixel(x, y)[0]) {
                found_pixels = true;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    if !found_pixels {
        return None;
    }

    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Derive the physical-area-per-pixel scale factor.
///
/// `length` and `width` are the real-world dimensions of the photographed
/// reference, in the same physical unit. The mask's bounding-box height is
/// assumed to span `length` and its width to span `width`; orienting the
/// photo consistently is the caller's job. No correction is applied for
/// lens distortion or perspective skew.
///
/// Fails with `NoLeafDetected` on an all-zero mask; the check must happen
/// here, before the division.
pub fn scale_factor(mask: &GrayImage, length: f64, width: f64) -> Result<f64> {
    let bbox = bounding_box(mask).ok_or(LeafAreaError::NoLeafDetected)?;

    Ok((length / bbox.height as f64) * (width / bbox.width as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Luma;

    fn mask_with_rect(x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut mask = GrayImage::from_pixel(100, 100, Luma([0]));
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    #[test]
    fn bounding_box_of_empty_mask_is_none() {
        let mask = GrayImage::from_pixel(50, 50, Luma([0]));
        assert!(bounding_box(&mask).is_none());
    }

    #[test]
    fn bounding_box_is_tight() {
        let mask = mask_with_rect(10, 20, 49, 39);
        let bbox = bounding_box(&mask).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 10,
                y: 20,
                width: 40,
                height: 20
            }
        );
    }

    #[test]
    fn bounding_box_of_a_single_pixel() {
        let mut mask = GrayImage::from_pixel(10, 10, Luma([0]));
        mask.put_pixel(7, 3, Luma([255]));
        let bbox = bounding_box(&mask).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 7,
                y: 3,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn empty_mask_raises_no_leaf_detected() {
        let mask = GrayImage::from_pixel(50, 50, Luma([0]));
        let result = scale_factor(&mask, 10.0, 5.0);
        assert!(matches!(result, Err(LeafAreaError::NoLeafDetected)));
    }

    #[test]
    fn scale_reduces_to_one_for_matching_dimensions() {
        let mask = mask_with_rect(10, 20, 49, 39);
        // Reference dimensions equal to the pixel dimensions: 20 tall, 40 wide
        let scale = scale_factor(&mask, 20.0, 40.0).unwrap();
        assert_approx_eq!(scale, 1.0);
    }

    #[test]
    fn scale_follows_the_reference_dimensions() {
        let mask = mask_with_rect(0, 0, 39, 19);
        // 10 units over 20 px of height, 8 units over 40 px of width
        let scale = scale_factor(&mask, 10.0, 8.0).unwrap();
        assert_approx_eq!(scale, (10.0 / 20.0) * (8.0 / 40.0));
    }
}
