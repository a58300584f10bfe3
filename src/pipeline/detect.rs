//! # Bounding Region Detection Module
//!
//! Extracts contours from the binarized mask, selects the largest one, and
//! computes both its minimum-area bounding rectangle (with rotation angle)
//! and its axis-aligned bounding box.

use image::{DynamicImage, GrayImage, Rgb};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_line_segment_mut;
use std::time::Instant;
use tracing;

use super::types::DetectedRegion;
use crate::errors::{RectifyError, RectifyResult};
use crate::geometry::Contour;

/// Contours with less enclosed area than this are treated as degenerate.
const MIN_CONTOUR_AREA: f64 = 1.0;

/// Detects the document region in a binarized mask.
///
/// Contours are extracted hierarchically (outer and inner boundaries) and
/// the one with the largest enclosed area is selected; ties keep the first
/// contour encountered. The color image is only used to produce the
/// annotated diagnostic copy; nothing downstream consumes it.
///
/// # Arguments
///
/// * `mask` - Binary foreground mask from region binarization
/// * `color` - The image the contour coordinates apply to
///
/// # Returns
///
/// Returns a `DetectedRegion`, or `NoContourFound`/`DegenerateContour` when
/// the mask has no usable boundary.
pub fn detect_bounding_region(
    mask: &GrayImage,
    color: &DynamicImage,
) -> RectifyResult<DetectedRegion> {
    let start_time = Instant::now();

    let raw_contours = find_contours::<i32>(mask);
    if raw_contours.is_empty() {
        tracing::warn!(
            target: "rectify",
            "No contours found in {}x{} mask",
            mask.width(),
            mask.height()
        );
        return Err(RectifyError::NoContourFound);
    }
    let contour_count = raw_contours.len();

    // Largest enclosed area wins; strict comparison keeps the
    // first-encountered contour on ties.
    let mut largest: Option<(Contour, f64)> = None;
    for raw in &raw_contours {
        let contour = Contour::from_imageproc_points(&raw.points);
        let area = contour.area();
        let is_better = match &largest {
            Some((_, best_area)) => area > *best_area,
            None => true,
        };
        if is_better {
            largest = Some((contour, area));
        }
    }
    let (contour, area) = match largest {
        Some(found) => found,
        None => return Err(RectifyError::NoContourFound),
    };

    if contour.points.len() < 3 || area < MIN_CONTOUR_AREA {
        return Err(RectifyError::DegenerateContour {
            points: contour.points.len(),
            area,
        });
    }

    let min_rect = contour.min_area_rect();
    let bbox = contour.bounding_box();
    let annotated = annotate_rectangle(color, &min_rect.corner_points());

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "rectify",
        "Bounding region detected in {:.2}ms: {} contours, largest area {:.0}, raw angle {:.2}",
        processing_time.as_millis(),
        contour_count,
        area,
        min_rect.angle
    );

    Ok(DetectedRegion {
        contour,
        min_rect,
        bbox,
        annotated,
        contour_count,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Draws the rotated rectangle's outline onto a copy of the image.
fn annotate_rectangle(image: &DynamicImage, corners: &[(f32, f32); 4]) -> DynamicImage {
    let mut canvas = image.to_rgb8();
    let stroke = Rgb([0u8, 255u8, 0u8]);
    for i in 0..4 {
        let j = (i + 1) % 4;
        draw_line_segment_mut(&mut canvas, corners[i], corners[j], stroke);
    }
    DynamicImage::ImageRgb8(canvas)
}
