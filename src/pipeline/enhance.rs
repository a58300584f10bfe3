//! # Text Enhancement Module
//!
//! Final binarization of the cropped document. The threshold is derived
//! from the brightness of the image's central region, so uneven margins and
//! shadow at the borders do not skew it.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use std::time::Instant;
use tracing;

use super::edges::gaussian_sigma_for_kernel;
use super::types::EnhancedImageResult;
use crate::config::EnhanceConfig;
use crate::errors::RectifyResult;
use crate::geometry::BoundingBox;

/// Produces the final black/white image handed to the recognizer.
///
/// The threshold is the mean intensity of the central region (the
/// `roi_margin` fraction is excluded on every side) scaled by
/// `brightness_factor`. Pixels strictly above the threshold become white.
/// With the default kernel of 1 the smoothing pass is the identity.
///
/// # Arguments
///
/// * `image` - The cropped document image
/// * `config` - Enhancement settings
///
/// # Returns
///
/// Returns an `EnhancedImageResult` with the binary image and the threshold
/// that was applied.
pub fn enhance_text(
    image: &DynamicImage,
    config: &EnhanceConfig,
) -> RectifyResult<EnhancedImageResult> {
    let start_time = Instant::now();

    let gray = image.to_luma8();
    let roi = central_region(gray.width(), gray.height(), config.roi_margin);
    let threshold = region_mean(&gray, &roi) * config.brightness_factor as f64;

    let blurred = if config.blur_kernel > 1 {
        gaussian_blur_f32(&gray, gaussian_sigma_for_kernel(config.blur_kernel))
    } else {
        gray
    };

    let mut binary = GrayImage::new(blurred.width(), blurred.height());
    for (x, y, pixel) in blurred.enumerate_pixels() {
        let value = if (pixel[0] as f64) > threshold { 255u8 } else { 0u8 };
        binary.put_pixel(x, y, Luma([value]));
    }

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Text enhancement completed in {:.2}ms: roi={:?}, threshold={:.3}",
        processing_time.as_millis(),
        roi,
        threshold
    );

    Ok(EnhancedImageResult {
        image: binary,
        threshold,
        roi,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// The central region left after excluding `margin` of each dimension on
/// every side. Degenerates to the full image when the extents are tiny.
fn central_region(width: u32, height: u32, margin: f32) -> BoundingBox {
    let x0 = (width as f32 * margin) as u32;
    let y0 = (height as f32 * margin) as u32;
    let x1 = (width as f32 * (1.0 - margin)).ceil() as u32;
    let y1 = (height as f32 * (1.0 - margin)).ceil() as u32;

    if x1 <= x0 || y1 <= y0 {
        return BoundingBox::new(0, 0, width, height);
    }
    BoundingBox::new(x0 as i32, y0 as i32, x1 - x0, y1 - y0)
}

/// Mean intensity over a region assumed to lie inside the image.
fn region_mean(image: &GrayImage, region: &BoundingBox) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;

    let x0 = region.x as u32;
    let y0 = region.y as u32;
    for y in y0..y0 + region.height {
        for x in x0..x0 + region.width {
            sum += image.get_pixel(x, y)[0] as u64;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_like_image(width: u32, height: u32) -> DynamicImage {
        // Bright paper with dark strokes.
        let mut img = GrayImage::from_pixel(width, height, Luma([230]));
        for y in (10..height - 10).step_by(12) {
            for x in 10..width - 10 {
                img.put_pixel(x, y, Luma([30]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_output_is_binary() {
        let result = enhance_text(&text_like_image(80, 100), &EnhanceConfig::default()).unwrap();
        for pixel in result.image.pixels() {
            assert!(pixel[0] == 0 || pixel[0] == 255);
        }
    }

    #[test]
    fn test_threshold_tracks_central_brightness() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([200])));
        let result = enhance_text(&img, &EnhanceConfig::default()).unwrap();

        // Uniform 200 region scaled by the default 0.98 factor.
        assert!((result.threshold - 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_dark_strokes_stay_black_paper_stays_white() {
        let result = enhance_text(&text_like_image(80, 100), &EnhanceConfig::default()).unwrap();
        assert_eq!(result.image.get_pixel(40, 2)[0], 255);

        let strokes = result.image.pixels().filter(|p| p[0] == 0).count();
        assert!(strokes > 0, "expected dark strokes to survive binarization");
    }

    #[test]
    fn test_enhancement_is_idempotent_on_binary_images() {
        let first = enhance_text(&text_like_image(80, 100), &EnhanceConfig::default()).unwrap();
        let second = enhance_text(
            &DynamicImage::ImageLuma8(first.image.clone()),
            &EnhanceConfig::default(),
        )
        .unwrap();
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn test_all_black_input_stays_black() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([0])));
        let result = enhance_text(&img, &EnhanceConfig::default()).unwrap();
        assert!(result.image.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_central_region_default_margin() {
        let roi = central_region(200, 100, 0.05);
        assert_eq!(roi.x, 10);
        assert_eq!(roi.y, 5);
        assert_eq!(roi.width, 180);
        assert_eq!(roi.height, 90);
    }

    #[test]
    fn test_central_region_degenerates_to_full_image() {
        let roi = central_region(3, 3, 0.49);
        assert_eq!(roi, BoundingBox::new(0, 0, 3, 3));
    }

    #[test]
    fn test_region_mean_subregion() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([0]));
        for y in 0..5 {
            for x in 0..5 {
                img.put_pixel(x, y, Luma([100]));
            }
        }
        let mean = region_mean(&img, &BoundingBox::new(0, 0, 5, 5));
        assert_eq!(mean, 100.0);
    }
}
