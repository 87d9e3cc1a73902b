#![deny(missing_docs)]
//! # AcTag
//!
//! Decoding of AcTag fiducial markers in binarized imaging sonar frames.

use std::sync::Arc;

use actag_image::Image;
use serde::{Deserialize, Serialize};

use crate::{
    decoder::{decode_all_with_strategy, DecodedTag},
    errors::AcTagError,
    family::{TagFamilySpec, TagFamilyTable},
    parallel::ExecutionStrategy,
    sonar::SonarGeometry,
    utils::{BinaryPixel, Quad},
};

/// Error types for AcTag decoding.
pub mod errors;

/// Points, quads and pixel types shared by the decoding stages.
pub mod utils;

/// AcTag family definitions and the expanded codeword table.
pub mod family;

/// Homography estimation between tag space and image space.
pub mod homography;

/// Sonar geometry and the image to polar coordinate mapping.
pub mod sonar;

/// Execution strategies for decoding many quads.
pub mod parallel;

/// Decoding utilities for AcTag detection.
pub mod decoder;

/// Configuration for decoding AcTags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeTagsConfig {
    /// The tag family to decode.
    pub family: TagFamilySpec,
    /// The number of bit errors to correct, at most [`TagFamilySpec::max_bit_corrections`].
    #[serde(default)]
    pub bit_corrections: usize,
    /// How the candidate quads of a frame are decoded.
    #[serde(default)]
    pub strategy: ExecutionStrategy,
}

impl DecodeTagsConfig {
    /// Creates a new `DecodeTagsConfig` for the given family, without bit correction.
    pub fn new(family: TagFamilySpec) -> Self {
        Self {
            family,
            bit_corrections: 0,
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Creates a `DecodeTagsConfig` from a family name such as `AcTag24h10`.
    pub fn from_family_name(name: &str, tag_size: f64) -> Result<Self, AcTagError> {
        Ok(Self::new(TagFamilySpec::from_name(name, tag_size)?))
    }

    /// Sets the number of bit errors to correct.
    ///
    /// # Errors
    ///
    /// Returns [`AcTagError::TooManyBitCorrections`] if `bit_corrections` is above
    /// what the family Hamming distance can correct unambiguously.
    pub fn with_bit_corrections(mut self, bit_corrections: usize) -> Result<Self, AcTagError> {
        self.bit_corrections = bit_corrections;
        self.validate()?;
        Ok(self)
    }

    /// Sets the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Checks the bit corrections against the family limit.
    pub fn validate(&self) -> Result<(), AcTagError> {
        let max = self.family.max_bit_corrections();
        if self.bit_corrections > max {
            return Err(AcTagError::TooManyBitCorrections {
                requested: self.bit_corrections,
                max,
            });
        }
        Ok(())
    }
}

/// Decoder for AcTag detection in sonar frames.
///
/// The family table is shared, so decoders for several sonars can be created from
/// the same table without copying it.
#[derive(Debug, Clone)]
pub struct AcTagDecoder {
    config: DecodeTagsConfig,
    table: Arc<TagFamilyTable>,
    sonar: SonarGeometry,
}

impl AcTagDecoder {
    /// Creates a new `AcTagDecoder`.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for decoding AcTags.
    /// * `table` - The expanded codeword table of the configured family.
    /// * `sonar` - The geometry of the sonar producing the frames.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the new `AcTagDecoder` or an `AcTagError` if the
    /// configuration is invalid or does not describe the family of `table`.
    pub fn new(
        config: DecodeTagsConfig,
        table: Arc<TagFamilyTable>,
        sonar: SonarGeometry,
    ) -> Result<Self, AcTagError> {
        config.validate()?;

        if config.family.data_bits() != table.data_bits() {
            return Err(AcTagError::FamilyMismatch {
                spec: config.family.data_bits(),
                table: table.data_bits(),
            });
        }

        Ok(Self {
            config,
            table,
            sonar,
        })
    }

    /// Returns a reference to the decoder configuration.
    #[inline]
    pub fn config(&self) -> &DecodeTagsConfig {
        &self.config
    }

    /// Returns the shared family table.
    #[inline]
    pub fn table(&self) -> &Arc<TagFamilyTable> {
        &self.table
    }

    /// Returns the sonar geometry.
    #[inline]
    pub fn sonar(&self) -> &SonarGeometry {
        &self.sonar
    }

    /// Decodes the AcTags found in the candidate quads of a binarized frame.
    ///
    /// # Arguments
    ///
    /// * `image` - The binarized sonar frame.
    /// * `quads` - The candidate quads found by the quad detector.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the decoded tags, in quad order, or an `AcTagError`.
    pub fn decode<T: BinaryPixel>(
        &self,
        image: &Image<T>,
        quads: &[Quad],
    ) -> Result<Vec<DecodedTag>, AcTagError> {
        decode_all_with_strategy(
            image,
            quads,
            &self.sonar,
            &self.config.family,
            &self.table,
            self.config.bit_corrections,
            self.config.strategy,
        )
    }
}
