#![deny(missing_docs)]
//! Image containers for binarized sonar frames

/// image representation for sonar frames.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
