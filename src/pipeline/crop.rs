//! # Document Cropping Module
//!
//! Extracts the detected document region from the tilt-corrected image.
//! The box must lie fully inside the image; an out-of-bounds box is an
//! error, never silently resized.

use image::DynamicImage;
use std::time::Instant;
use tracing;

use super::types::CroppedImageResult;
use crate::errors::{RectifyError, RectifyResult};
use crate::geometry::BoundingBox;

/// Crops the image to the given bounding box.
///
/// # Arguments
///
/// * `image` - The tilt-corrected image
/// * `crop_box` - The document bounding box, expressed in this image's frame
///
/// # Returns
///
/// Returns a `CroppedImageResult` whose image dimensions equal the box's
/// width and height exactly, or `CropOutOfBounds` when the box exceeds the
/// image extents.
pub fn crop_to_region(
    image: &DynamicImage,
    crop_box: &BoundingBox,
) -> RectifyResult<CroppedImageResult> {
    let start_time = Instant::now();

    let (width, height) = (image.width(), image.height());
    if crop_box.width == 0 || crop_box.height == 0 || !crop_box.fits_within(width, height) {
        return Err(RectifyError::CropOutOfBounds {
            bbox: *crop_box,
            image_width: width,
            image_height: height,
        });
    }

    let cropped = image.crop_imm(
        crop_box.x as u32,
        crop_box.y as u32,
        crop_box.width,
        crop_box.height,
    );

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Cropped {}x{} image to {:?} in {:.2}ms",
        width,
        height,
        crop_box,
        processing_time.as_millis()
    );

    Ok(CroppedImageResult {
        image: cropped,
        crop_box: *crop_box,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}
