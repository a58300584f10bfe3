//! # Shared Types for the Rectification Pipeline
//!
//! This module contains the result structs produced by the pipeline stages.
//! Each stage returns its output image together with the scalar decisions it
//! made, so nothing travels between stages through shared state.

use image::{DynamicImage, GrayImage};

use crate::geometry::{BoundingBox, Contour, MinAreaRect};

/// Result of the coarse orientation normalization stage.
#[derive(Debug, Clone)]
pub struct OrientationResult {
    /// The orientation-normalized image
    pub image: DynamicImage,
    /// Whether a quarter-turn was applied
    pub rotated: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of edge map construction.
#[derive(Debug, Clone)]
pub struct EdgeMapResult {
    /// Binary edge image
    pub image: GrayImage,
    /// Gaussian sigma derived from the configured kernel size
    pub sigma: f32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of edge map binarization.
#[derive(Debug, Clone)]
pub struct BinarizedRegionResult {
    /// Binary foreground mask
    pub image: GrayImage,
    /// Threshold used, always the mean intensity of the input edge map
    pub threshold: f64,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of bounding region detection.
#[derive(Debug, Clone)]
pub struct DetectedRegion {
    /// The largest-area contour found in the mask
    pub contour: Contour,
    /// Minimum-area bounding rectangle of the contour
    pub min_rect: MinAreaRect,
    /// Axis-aligned bounding box of the contour
    pub bbox: BoundingBox,
    /// Copy of the input with the rectangle corners drawn (diagnostic only)
    pub annotated: DynamicImage,
    /// Total number of contours the mask produced
    pub contour_count: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Tilt normalization and the rotation chosen for it.
///
/// Short-lived: parameterizes a single rotation call and is carried in the
/// final result for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltDecision {
    /// Canonical tilt angle in [0, 90) degrees
    pub uniform_angle: f32,
    /// Rotation the policy table selected, in degrees counter-clockwise
    pub rotation_to_apply: f32,
    /// Remaining rotation (360 - rotation_to_apply), reported for logging
    pub residual: f32,
}

/// Result of applying the tilt correction rotation.
#[derive(Debug, Clone)]
pub struct TiltCorrectionResult {
    /// The rotated image (dimensions preserved)
    pub image: DynamicImage,
    /// The decision that produced the rotation
    pub decision: TiltDecision,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of cropping to the detected region.
#[derive(Debug, Clone)]
pub struct CroppedImageResult {
    /// The cropped image
    pub image: DynamicImage,
    /// The box that was extracted
    pub crop_box: BoundingBox,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of the final text enhancement stage.
#[derive(Debug, Clone)]
pub struct EnhancedImageResult {
    /// Final binary (black/white) image
    pub image: GrayImage,
    /// Threshold derived from the central region brightness
    pub threshold: f64,
    /// The central region the brightness was sampled from
    pub roi: BoundingBox,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Terminal artifact of a full pipeline run.
#[derive(Debug, Clone)]
pub struct RectifiedImage {
    /// Final binary image, the input to the recognition collaborator
    pub image: GrayImage,
    /// Tilt decision made during the run
    pub decision: TiltDecision,
    /// Crop box applied in the rotated frame
    pub crop_box: BoundingBox,
    /// Threshold used by the text enhancement stage
    pub enhance_threshold: f64,
    /// Total processing time in milliseconds
    pub processing_time_ms: u32,
}
