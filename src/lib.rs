//! # Receipt Rectify
//!
//! A document image rectification pipeline: takes an arbitrarily oriented,
//! tilted photograph of a paper receipt or invoice and produces a cropped,
//! deskewed, binarized image suitable as input to a downstream
//! text-recognition model.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod pipeline;
pub mod recognition;

// Re-export types for easier access
pub use config::RectifyConfig;
pub use errors::{RectifyError, RectifyResult};
pub use pipeline::{rectify, RectifiedImage, TiltDecision};
pub use recognition::{Recognition, Recognizer};
