use image::{GrayImage, Rgb};

/// Constants
pub const FOREGROUND: u8 = 255; // Mask value marking leaf pixels
pub const BACKGROUND: u8 = 0;

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

/// Check if a mask pixel marks leaf tissue
#[inline]
pub fn is_foreground(value: u8) -> bool {
    value > 0
}

/// Count the nonzero pixels of a mask
pub fn count_nonzero(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| is_foreground(p[0])).count() as u64
}

/// HSV saturation of an RGB pixel on a 0-255 scale.
///
/// S = 255 * (max - min) / max, and 0 for black, matching the S channel of
/// the usual byte-valued HSV conversion.
#[inline]
pub fn saturation(pixel: &Rgb<u8>) -> u8 {
    let max = pixel[0].max(pixel[1]).max(pixel[2]);
    let min = pixel[0].min(pixel[1]).min(pixel[2]);

    if max == 0 {
        return 0;
    }

    ((max - min) as u32 * 255 / max as u32) as u8
}
