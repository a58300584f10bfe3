//! # Region Binarization Module
//!
//! Turns the edge map into a solid foreground blob: a global threshold at
//! the edge map's own mean intensity, followed by dilation passes that close
//! small gaps in the boundary.

use image::{GrayImage, Luma};
use std::time::Instant;
use tracing;

use super::edges::dilate_max;
use super::types::BinarizedRegionResult;
use crate::config::BinarizeConfig;
use crate::errors::RectifyResult;

/// Binarizes an edge map into a closed foreground mask.
///
/// The threshold is always recomputed as the arithmetic mean of the input's
/// pixel intensities; it is deliberately not a tunable. Pixels strictly
/// above the mean become foreground.
///
/// # Arguments
///
/// * `edges` - The binary edge image from edge map construction
/// * `config` - Gap-closing kernel settings
///
/// # Returns
///
/// Returns a `BinarizedRegionResult` with the mask and the threshold used.
pub fn binarize_region(
    edges: &GrayImage,
    config: &BinarizeConfig,
) -> RectifyResult<BinarizedRegionResult> {
    let start_time = Instant::now();

    let threshold = mean_intensity(edges);

    let (width, height) = edges.dimensions();
    let mut mask = GrayImage::new(width, height);
    for (x, y, pixel) in edges.enumerate_pixels() {
        let value = if (pixel[0] as f64) > threshold { 255u8 } else { 0u8 };
        mask.put_pixel(x, y, Luma([value]));
    }

    let radius = config.close_kernel / 2;
    for _ in 0..config.close_passes {
        mask = dilate_max(&mask, radius);
    }

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Region binarization completed in {:.2}ms: threshold={:.3}, close_kernel={}x{}",
        processing_time.as_millis(),
        threshold,
        config.close_kernel,
        config.close_passes
    );

    Ok(BinarizedRegionResult {
        image: mask,
        threshold,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Arithmetic mean of all pixel intensities.
pub(crate) fn mean_intensity(image: &GrayImage) -> f64 {
    let total_pixels = (image.width() as u64 * image.height() as u64).max(1);
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    sum as f64 / total_pixels as f64
}
