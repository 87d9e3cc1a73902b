use serde::{Deserialize, Serialize};

use crate::errors::AcTagError;

/// A point in image space, in `(row, col)` order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// The row coordinate (range axis of the sonar image).
    pub row: f64,
    /// The column coordinate (azimuth axis of the sonar image).
    pub col: f64,
}

impl Point2 {
    /// Creates a new point from its row and column.
    #[inline]
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

/// An integer pixel location in `(row, col)` order.
///
/// Coordinates are signed so that samples falling before the first row or column
/// can be represented and rejected by the bounds check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    /// The row of the pixel.
    pub row: i64,
    /// The column of the pixel.
    pub col: i64,
}

impl PixelCoord {
    /// Returns the `(row, col)` pair as unsigned indices if it lies inside a `height x width` image.
    #[inline]
    pub fn in_bounds(&self, height: usize, width: usize) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        (row < height && col < width).then_some((row, col))
    }
}

/// A `(range, azimuth)` pair in meters and radians.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// The range in meters.
    pub range: f64,
    /// The azimuth in radians.
    pub azimuth: f64,
}

/// A candidate quadrilateral, believed to be the inner white square of a tag.
///
/// The corners are ordered around the boundary by the upstream quad detector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// The four corners of the quad.
    pub corners: [Point2; 4],
}

impl Quad {
    /// Creates a quad from four corners.
    pub const fn new(corners: [Point2; 4]) -> Self {
        Self { corners }
    }

    /// Creates a quad from a slice of `[row, col]` points.
    ///
    /// # Errors
    ///
    /// Returns [`AcTagError::InvalidQuad`] if the slice does not hold exactly 4 points.
    pub fn from_points(points: &[[f64; 2]]) -> Result<Self, AcTagError> {
        let corners: &[[f64; 2]; 4] = points
            .try_into()
            .map_err(|_| AcTagError::InvalidQuad(points.len()))?;

        Ok(Self::from(*corners))
    }

    /// Returns the corners rotated so that `rotated[c] = corners[(c - steps) mod 4]`.
    pub fn rolled(&self, steps: usize) -> [Point2; 4] {
        std::array::from_fn(|c| self.corners[(c + 4 - steps % 4) % 4])
    }
}

impl From<[[f64; 2]; 4]> for Quad {
    fn from(value: [[f64; 2]; 4]) -> Self {
        Self::new(value.map(Point2::from))
    }
}

/// A pixel type which can be read as a single bit of a binarized image.
pub trait BinaryPixel: Copy + Send + Sync {
    /// Returns 1 for a white (set) pixel and 0 otherwise.
    fn bit(&self) -> u8;
}

impl BinaryPixel for u8 {
    #[inline]
    fn bit(&self) -> u8 {
        u8::from(*self != 0)
    }
}

impl BinaryPixel for bool {
    #[inline]
    fn bit(&self) -> u8 {
        u8::from(*self)
    }
}
