use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;

use crate::config::Config;
use crate::image_utils::{BACKGROUND, FOREGROUND};
use crate::morphology::close_mask;

/// Separate leaf pixels from background.
///
/// The image is reduced to luma-weighted grayscale, split with Otsu's
/// global threshold and inverted so that pixels at or below the level,
/// assumed to be the darker leaf tissue, become foreground. Bright leaves
/// on dark backgrounds will invert incorrectly; nothing validates the
/// assumption. The thresholded mask is then closed with a small box kernel
/// to bridge gaps and drop speckle without materially growing the
/// silhouette.
pub fn segment_leaf(image: &RgbImage, config: &Config) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let level = otsu_level(&gray);

    let mask = threshold_inverted(&gray, level);

    close_mask(&mask, config.closing_kernel_size, config.closing_iterations)
}

/// Binarize with dark pixels as foreground (value <= level -> 255)
fn threshold_inverted(gray: &GrayImage, level: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut mask = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let value = gray.get_pixel(x, y)[0];
            let mask_value = if value <= level { FOREGROUND } else { BACKGROUND };
            mask.put_pixel(x, y, Luma([mask_value]));
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_utils::{count_nonzero, is_foreground};
    use image::Rgb;

    fn white_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([220, 220, 220]))
    }

    fn fill_rect(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                image.put_pixel(x, y, Rgb(color));
            }
        }
    }

    #[test]
    fn dark_rectangle_on_light_background_segments_exactly() {
        let mut image = white_image(100, 100);
        fill_rect(&mut image, 10, 10, 49, 29, [30, 30, 30]);

        let mask = segment_leaf(&image, &Config::default());
        assert_eq!(count_nonzero(&mask), 40 * 20);
        for y in 0..100 {
            for x in 0..100 {
                let expected = (10..=49).contains(&x) && (10..=29).contains(&y);
                assert_eq!(
                    is_foreground(mask.get_pixel(x, y)[0]),
                    expected,
                    "unexpected mask value at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn uniform_image_yields_an_empty_mask() {
        // Degenerate threshold: Otsu on a single-tone image lands below
        // every pixel, leaving nothing in the inverted mask. The empty
        // mask is caught downstream by the bounding-box check.
        let image = white_image(32, 32);
        let mask = segment_leaf(&image, &Config::default());
        assert_eq!(count_nonzero(&mask), 0);
    }

    #[test]
    fn cleanup_keeps_the_leaf_body_solid_under_noise() {
        let mut image = white_image(80, 80);
        fill_rect(&mut image, 20, 20, 59, 59, [25, 60, 25]);
        // Single-pixel dark speck far from the leaf
        image.put_pixel(5, 70, Rgb([25, 60, 25]));

        let mask = segment_leaf(&image, &Config::default());
        for y in 20..=59 {
            for x in 20..=59 {
                assert!(is_foreground(mask.get_pixel(x, y)[0]));
            }
        }
    }
}
