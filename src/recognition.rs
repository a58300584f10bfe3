//! # Recognition Collaborator Seam
//!
//! The rectification pipeline hands its final image to a downstream
//! text-recognition model. That model, its loading, and its output schema
//! live outside this crate; this module only defines the seam: a trait the
//! host wires its recognizer into, invoked once per pipeline run.

use image::DynamicImage;

use crate::config::RectifyConfig;
use crate::errors::RectifyResult;
use crate::pipeline::{rectify, RectifiedImage};

/// Opaque prediction returned by a recognition backend.
///
/// Backends differ in what they produce; this crate does not depend on
/// which shape comes back.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// Free-form extracted text
    Text(String),
    /// Structured field map (e.g., parsed invoice fields)
    Fields(serde_json::Value),
}

/// A text-recognition collaborator.
///
/// Implementations receive the rectified binary image and return an opaque
/// prediction. The pipeline never retries a recognizer; error policy
/// belongs to the host.
pub trait Recognizer {
    fn recognize(&self, image: &DynamicImage) -> RectifyResult<Recognition>;
}

/// Rectifies an image and runs the recognizer on the result.
///
/// Convenience wrapper for hosts that want the whole
/// rectify-then-recognize flow as one call; the recognizer is invoked
/// exactly once.
pub fn rectify_and_recognize<R: Recognizer>(
    image: &DynamicImage,
    config: &RectifyConfig,
    recognizer: &R,
) -> RectifyResult<(RectifiedImage, Recognition)> {
    let rectified = rectify(image, config)?;
    let prediction = recognizer.recognize(&DynamicImage::ImageLuma8(rectified.image.clone()))?;
    Ok((rectified, prediction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::cell::Cell;

    /// Recognizer double that records how often it ran.
    struct CountingRecognizer {
        calls: Cell<u32>,
    }

    impl Recognizer for CountingRecognizer {
        fn recognize(&self, image: &DynamicImage) -> RectifyResult<Recognition> {
            self.calls.set(self.calls.get() + 1);
            Ok(Recognition::Text(format!(
                "{}x{}",
                image.width(),
                image.height()
            )))
        }
    }

    fn receipt_image() -> DynamicImage {
        let mut img = GrayImage::from_pixel(160, 220, Luma([15]));
        for y in 40..180 {
            for x in 30..130 {
                img.put_pixel(x, y, Luma([235]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_recognizer_invoked_once_per_run() {
        let recognizer = CountingRecognizer {
            calls: Cell::new(0),
        };
        let (rectified, prediction) =
            rectify_and_recognize(&receipt_image(), &RectifyConfig::default(), &recognizer)
                .unwrap();

        assert_eq!(recognizer.calls.get(), 1);
        assert_eq!(
            prediction,
            Recognition::Text(format!(
                "{}x{}",
                rectified.image.width(),
                rectified.image.height()
            ))
        );
    }

    #[test]
    fn test_recognizer_not_invoked_on_pipeline_failure() {
        let recognizer = CountingRecognizer {
            calls: Cell::new(0),
        };
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([0])));
        let result = rectify_and_recognize(&blank, &RectifyConfig::default(), &recognizer);

        assert!(result.is_err());
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_structured_fields_roundtrip() {
        let fields = serde_json::json!({"total": "12.90", "currency": "EUR"});
        let prediction = Recognition::Fields(fields.clone());
        assert_eq!(prediction, Recognition::Fields(fields));
    }
}
