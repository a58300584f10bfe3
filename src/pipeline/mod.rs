//! # Document Rectification Pipeline
//!
//! This module provides the geometric and photometric pipeline that turns an
//! arbitrarily oriented photograph of a paper receipt or invoice into a
//! cropped, deskewed, binarized image ready for a text-recognition model.
//!
//! The pipeline is a single linear sequence with no feedback loops:
//! - `orientation`: coarse quarter-turn normalization
//! - `edges`: grayscale, blur, dilation, Canny edge map
//! - `binarize`: mean-threshold binarization into a solid blob
//! - `detect`: contour extraction and minimum-area rectangle
//! - `tilt`: tilt normalization, correction policy, rotation
//! - `crop`: extraction of the detected document region
//! - `enhance`: final brightness-derived binarization
//! - `types`: shared stage result structs
//!
//! Every invocation owns its whole chain of intermediate values; stages pass
//! their decisions forward as explicit return values, so concurrent
//! invocations never share mutable state.

pub mod binarize;
pub mod crop;
pub mod detect;
pub mod edges;
pub mod enhance;
pub mod orientation;
pub mod tilt;
pub mod types;

// Re-export commonly used types and functions for convenience
pub use types::{
    BinarizedRegionResult, CroppedImageResult, DetectedRegion, EdgeMapResult,
    EnhancedImageResult, OrientationResult, RectifiedImage, TiltCorrectionResult, TiltDecision,
};

pub use binarize::binarize_region;
pub use crop::crop_to_region;
pub use detect::detect_bounding_region;
pub use edges::build_edge_map;
pub use enhance::enhance_text;
pub use orientation::normalize_orientation;
pub use tilt::{correct_tilt, estimate_tilt, estimate_uniform_angle, transform_bounding_box};

use image::DynamicImage;
use std::time::Instant;
use tracing;

use crate::config::RectifyConfig;
use crate::errors::{RectifyError, RectifyResult};

/// Runs the full rectification pipeline on a decoded image.
///
/// The stages run strictly in order and fail fast: the first stage that
/// cannot produce a usable result aborts the run with a tagged error. The
/// returned `RectifiedImage` carries the final binary image together with
/// the decisions the stages made.
///
/// # Arguments
///
/// * `image` - The decoded input photograph
/// * `config` - Pipeline configuration (defaults reproduce the reference
///   behavior)
///
/// # Examples
///
/// ```no_run
/// use receipt_rectify::{rectify, RectifyConfig};
/// use image::open;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let img = open("receipt.jpg")?;
/// let result = rectify(&img, &RectifyConfig::default())?;
/// println!("Corrected {:.1} degrees of tilt", result.decision.rotation_to_apply);
/// // result.image is the binarized document crop
/// # Ok(())
/// # }
/// ```
pub fn rectify(image: &DynamicImage, config: &RectifyConfig) -> RectifyResult<RectifiedImage> {
    let start_time = Instant::now();

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(RectifyError::EmptyImage { width, height });
    }

    let oriented = normalize_orientation(image)?;
    let edge_map = build_edge_map(&oriented.image, &config.edge)?;
    let mask = binarize_region(&edge_map.image, &config.binarize)?;
    let region = detect_bounding_region(&mask.image, &oriented.image)?;

    let decision = estimate_tilt(region.min_rect.angle, &config.tilt);
    let corrected = correct_tilt(&oriented.image, &decision)?;

    // The contour was detected before the rotation; its box is re-expressed
    // in the rotated frame so the crop stays aligned with the document.
    let crop_box = transform_bounding_box(
        &region.bbox,
        decision.rotation_to_apply,
        corrected.image.width(),
        corrected.image.height(),
    );
    let cropped = crop_to_region(&corrected.image, &crop_box)?;
    let enhanced = enhance_text(&cropped.image, &config.enhance)?;

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Rectification completed in {:.2}ms: uniform_angle={:.2}, rotation={:.2}, crop={:?}",
        processing_time.as_millis(),
        decision.uniform_angle,
        decision.rotation_to_apply,
        crop_box
    );

    Ok(RectifiedImage {
        image: enhanced.image,
        decision,
        crop_box,
        enhance_threshold: enhanced.threshold,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_empty_image_is_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 10));
        let result = rectify(&img, &RectifyConfig::default());
        assert!(matches!(result, Err(RectifyError::EmptyImage { .. })));
    }

    #[test]
    fn test_uniform_image_has_no_contour() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 160, Luma([255])));
        let result = rectify(&img, &RectifyConfig::default());
        assert_eq!(result.unwrap_err(), RectifyError::NoContourFound);
    }
}
