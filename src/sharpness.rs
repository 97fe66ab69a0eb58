//! Focus measure based on the variance of the Laplacian.
//!
//! Colour frames are reduced to BT.601 luma (`0.299 R + 0.587 G + 0.114 B`),
//! the plane the default thresholds are calibrated against. The luminance
//! plane is then convolved with the 3×3 Laplacian kernel
//!
//! ```text
//!  0  1  0
//!  1 -4  1
//!  0  1  0
//! ```
//!
//! and the population variance of the response is the sharpness score. Blurry
//! frames have few strong edges, so their response is flat and its variance is
//! low. Border pixels are handled by reflecting about the edge pixel
//! (`dcb|abcd|cba`), so every pixel of the plane contributes.
//!
//! # Example
//!
//! ```no_run
//! use sharpframes::sharpness;
//!
//! let image = image::open("frame.png").unwrap();
//! println!("score: {:.1}", sharpness::laplacian_variance(&image));
//! println!("sharp: {}", sharpness::is_sharp(&image, 80.0));
//! ```

use image::{DynamicImage, GrayImage, Luma};

/// Default threshold used by [`SelectionOptions`](crate::SelectionOptions).
pub const DEFAULT_BLUR_THRESHOLD: f64 = 80.0;

/// Returns `true` when the Laplacian variance of `frame` is at least
/// `threshold`.
///
/// Pure: the same frame and threshold always give the same answer.
pub fn is_sharp(frame: &DynamicImage, threshold: f64) -> bool {
    laplacian_variance(frame) >= threshold
}

/// Variance of the Laplacian of the frame's luminance. Higher means sharper.
pub fn laplacian_variance(frame: &DynamicImage) -> f64 {
    match frame {
        DynamicImage::ImageLuma8(gray) => laplacian_variance_luma(gray),
        _ => laplacian_variance_luma(&luma_bt601(frame)),
    }
}

/// BT.601 luma plane of `frame`, rounded to the nearest 8-bit value.
///
/// Alpha is ignored.
pub fn luma_bt601(frame: &DynamicImage) -> GrayImage {
    let rgb = frame.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Variance of the Laplacian of an 8-bit grayscale plane.
///
/// Returns `0.0` for an empty plane.
pub fn laplacian_variance_luma(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let (w, h) = (width as usize, height as usize);
    let pixels = gray.as_raw();
    let at = |x: usize, y: usize| pixels[y * w + x] as f64;

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for y in 0..h {
        let up = reflect(y as isize - 1, h);
        let down = reflect(y as isize + 1, h);
        for x in 0..w {
            let left = reflect(x as isize - 1, w);
            let right = reflect(x as isize + 1, w);
            let response = at(x, up) + at(x, down) + at(left, y) + at(right, y) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let count = (w * h) as f64;
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Reflect-101 border index: `-1 -> 1`, `len -> len - 2`.
fn reflect(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let reflected = if index < 0 {
        -index
    } else if index > last {
        2 * last - index
    } else {
        index
    };
    reflected.clamp(0, last) as usize
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma, RgbImage};

    use super::*;

    fn checkerboard(size: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn flat_image_has_zero_variance() {
        let flat = GrayImage::from_pixel(32, 32, Luma([128]));
        assert_eq!(laplacian_variance_luma(&flat), 0.0);
    }

    #[test]
    fn empty_image_has_zero_variance() {
        let empty = GrayImage::new(0, 0);
        assert_eq!(laplacian_variance_luma(&empty), 0.0);
    }

    #[test]
    fn single_pixel_has_zero_variance() {
        let dot = GrayImage::from_pixel(1, 1, Luma([200]));
        assert_eq!(laplacian_variance_luma(&dot), 0.0);
    }

    #[test]
    fn fine_texture_scores_higher_than_coarse() {
        let fine = laplacian_variance_luma(&checkerboard(64, 1));
        let coarse = laplacian_variance_luma(&checkerboard(64, 16));
        assert!(fine > coarse, "fine={fine} coarse={coarse}");
    }

    #[test]
    fn blurring_lowers_the_score() {
        let sharp = DynamicImage::ImageLuma8(checkerboard(64, 2));
        let blurred = sharp.blur(3.0);
        assert!(laplacian_variance(&sharp) > laplacian_variance(&blurred));
    }

    #[test]
    fn threshold_is_inclusive() {
        let image = DynamicImage::ImageLuma8(checkerboard(16, 4));
        let score = laplacian_variance(&image);
        assert!(is_sharp(&image, score));
        assert!(!is_sharp(&image, score + 1e-6));
    }

    #[test]
    fn luma_uses_bt601_weights() {
        let rgb = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([200, 30, 30])
            } else {
                image::Rgb([30, 30, 200])
            }
        });
        let luma = luma_bt601(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(luma.get_pixel(0, 0).0, [81]);
        assert_eq!(luma.get_pixel(1, 0).0, [49]);
    }

    #[test]
    fn colour_checker_scores_on_bt601_luma() {
        let rgb = RgbImage::from_fn(32, 32, |x, y| {
            if ((x / 2) + (y / 2)) % 2 == 0 {
                image::Rgb([200, 30, 30])
            } else {
                image::Rgb([30, 30, 200])
            }
        });
        let score = laplacian_variance(&DynamicImage::ImageRgb8(rgb));
        assert!((score - 3720.0).abs() < 1e-6, "score={score}");
    }

    #[test]
    fn evaluation_is_repeatable() {
        let image = DynamicImage::ImageLuma8(checkerboard(24, 3));
        assert_eq!(is_sharp(&image, 100.0), is_sharp(&image, 100.0));
        assert_eq!(laplacian_variance(&image), laplacian_variance(&image));
    }

    #[test]
    fn reflect_mirrors_about_the_edge() {
        assert_eq!(reflect(-1, 5), 1);
        assert_eq!(reflect(5, 5), 3);
        assert_eq!(reflect(2, 5), 2);
        assert_eq!(reflect(-1, 1), 0);
        assert_eq!(reflect(2, 2), 0);
    }
}
