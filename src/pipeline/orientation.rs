//! # Orientation Normalization Module
//!
//! Coarse 90-degree-class rotation so the document's long edge ends up
//! vertical. Receipts are assumed portrait; a landscape capture is assumed
//! to be rotated exactly one quarter turn.

use image::DynamicImage;
use std::time::Instant;
use tracing;

use super::types::OrientationResult;
use crate::errors::RectifyResult;

/// Rotates a landscape image a quarter-turn clockwise; portrait and square
/// images pass through unchanged.
///
/// No orientation metadata (e.g., camera EXIF) is consulted. The output
/// commonly has height >= width, but that is a property of typical receipt
/// captures, not an enforced postcondition.
///
/// # Arguments
///
/// * `image` - The decoded input image
///
/// # Returns
///
/// Returns an `OrientationResult` with the normalized image and whether a
/// rotation was applied.
pub fn normalize_orientation(image: &DynamicImage) -> RectifyResult<OrientationResult> {
    let start_time = Instant::now();
    let (width, height) = (image.width(), image.height());

    let (normalized, rotated) = if width > height {
        (image.rotate90(), true)
    } else {
        (image.clone(), false)
    };

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Orientation normalization completed in {:.2}ms: {}x{} -> {}x{}, rotated={}",
        processing_time.as_millis(),
        width,
        height,
        normalized.width(),
        normalized.height(),
        rotated
    );

    Ok(OrientationResult {
        image: normalized,
        rotated,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}
