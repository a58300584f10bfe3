//! # Rectification Error Types
//!
//! This module defines the error types used throughout the rectification
//! pipeline. Every stage fails fast: a stage either produces a usable image
//! or a tagged error, never a partially-valid result.

use std::fmt;

use crate::geometry::BoundingBox;

/// Errors that can occur during document rectification.
#[derive(Debug, Clone, PartialEq)]
pub enum RectifyError {
    /// Input image has zero width or height
    EmptyImage { width: u32, height: u32 },
    /// The binarized mask contained no contours (e.g., blank or uniform input)
    NoContourFound,
    /// The largest contour has fewer than 3 points or near-zero area
    DegenerateContour { points: usize, area: f64 },
    /// The computed crop box exceeds the source image extents
    CropOutOfBounds {
        bbox: BoundingBox,
        image_width: u32,
        image_height: u32,
    },
    /// Configuration validation errors
    Config(String),
    /// Failed to load or decode an image
    ImageLoad(String),
}

impl fmt::Display for RectifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RectifyError::EmptyImage { width, height } => {
                write!(f, "[EMPTY_IMAGE] input has invalid dimensions {}x{}", width, height)
            }
            RectifyError::NoContourFound => {
                write!(f, "[NO_CONTOUR] binarized mask yielded no contours")
            }
            RectifyError::DegenerateContour { points, area } => {
                write!(
                    f,
                    "[DEGENERATE_CONTOUR] largest contour unusable ({} points, area {:.2})",
                    points, area
                )
            }
            RectifyError::CropOutOfBounds {
                bbox,
                image_width,
                image_height,
            } => {
                write!(
                    f,
                    "[CROP_OUT_OF_BOUNDS] box {:?} exceeds image extents {}x{}",
                    bbox, image_width, image_height
                )
            }
            RectifyError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            RectifyError::ImageLoad(msg) => write!(f, "[IMAGE_LOAD] {}", msg),
        }
    }
}

impl std::error::Error for RectifyError {}

impl From<image::ImageError> for RectifyError {
    fn from(err: image::ImageError) -> Self {
        RectifyError::ImageLoad(err.to_string())
    }
}

/// Result type alias for convenience
pub type RectifyResult<T> = Result<T, RectifyError>;
