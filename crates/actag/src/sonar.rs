use actag_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::{
    errors::AcTagError,
    utils::{Point2, PolarPoint},
};

/// The acquisition settings of the sonar which produced a frame.
///
/// The first and last rows of a frame correspond to the maximum and minimum range,
/// and the first and last columns to the maximum and minimum azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSonarGeometry")]
pub struct SonarGeometry {
    min_range: f64,
    max_range: f64,
    horizontal_aperture: f64,
}

#[derive(Deserialize)]
struct RawSonarGeometry {
    min_range: f64,
    max_range: f64,
    horizontal_aperture: f64,
}

impl TryFrom<RawSonarGeometry> for SonarGeometry {
    type Error = AcTagError;

    fn try_from(raw: RawSonarGeometry) -> Result<Self, Self::Error> {
        Self::new(raw.min_range, raw.max_range, raw.horizontal_aperture)
    }
}

impl SonarGeometry {
    /// Creates a new sonar geometry.
    ///
    /// # Arguments
    ///
    /// * `min_range` - The minimum range of the sonar, in meters.
    /// * `max_range` - The maximum range of the sonar, in meters.
    /// * `horizontal_aperture` - The total horizontal field of view, in radians.
    ///
    /// # Errors
    ///
    /// Returns [`AcTagError::InvalidRange`] unless `0 < min_range < max_range`, and
    /// [`AcTagError::InvalidAperture`] unless `horizontal_aperture` is finite and positive.
    pub fn new(
        min_range: f64,
        max_range: f64,
        horizontal_aperture: f64,
    ) -> Result<Self, AcTagError> {
        let valid_range = min_range > 0.0 && min_range < max_range && max_range.is_finite();
        if !valid_range {
            return Err(AcTagError::InvalidRange(min_range, max_range));
        }

        if !horizontal_aperture.is_finite() || horizontal_aperture <= 0.0 {
            return Err(AcTagError::InvalidAperture(horizontal_aperture));
        }

        Ok(Self {
            min_range,
            max_range,
            horizontal_aperture,
        })
    }

    /// The minimum range, in meters.
    #[inline]
    pub fn min_range(&self) -> f64 {
        self.min_range
    }

    /// The maximum range, in meters.
    #[inline]
    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// The horizontal aperture, in radians.
    #[inline]
    pub fn horizontal_aperture(&self) -> f64 {
        self.horizontal_aperture
    }

    /// The azimuth of the last image column, in radians.
    #[inline]
    pub fn min_azimuth(&self) -> f64 {
        -self.horizontal_aperture / 2.0
    }

    /// The azimuth of the first image column, in radians.
    #[inline]
    pub fn max_azimuth(&self) -> f64 {
        self.horizontal_aperture / 2.0
    }
}

/// Maps image coordinates of a frame to `(range, azimuth)` coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarMap {
    ranges: Vec<f64>,
    azimuths: Vec<f64>,
}

impl PolarMap {
    /// Creates the map for frames of `size` captured with `sonar`.
    ///
    /// Row 0 maps to the maximum range and the last row to the minimum range. Column 0
    /// maps to the maximum azimuth and the last column to the minimum azimuth.
    pub fn new(sonar: &SonarGeometry, size: ImageSize) -> Self {
        Self {
            ranges: linspace(sonar.max_range(), sonar.min_range(), size.height),
            azimuths: linspace(sonar.max_azimuth(), sonar.min_azimuth(), size.width),
        }
    }

    /// The range of every image row.
    pub fn ranges(&self) -> &[f64] {
        &self.ranges
    }

    /// The azimuth of every image column.
    pub fn azimuths(&self) -> &[f64] {
        &self.azimuths
    }

    /// Returns the range and azimuth of an image point.
    ///
    /// Integer coordinates land exactly on the row and column tables, fractional
    /// coordinates are interpolated linearly between them.
    pub fn polar(&self, point: Point2) -> PolarPoint {
        PolarPoint {
            range: interpolate(&self.ranges, point.row),
            azimuth: interpolate(&self.azimuths, point.col),
        }
    }
}

/// `num` evenly spaced values from `start` to `end`, both included.
fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut values = (0..num).map(|i| start + i as f64 * step).collect::<Vec<_>>();
            values[num - 1] = end;
            values
        }
    }
}

/// Linear interpolation on an evenly spaced table, extended past both ends.
fn interpolate(values: &[f64], index: f64) -> f64 {
    match values {
        [] => f64::NAN,
        [value] => *value,
        [first, .., last] => {
            let t = index / (values.len() - 1) as f64;
            first + t * (last - first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sonar_geometry() -> Result<(), Box<dyn std::error::Error>> {
        let sonar = SonarGeometry::new(0.1, 5.0, 1.0472)?;
        assert_relative_eq!(sonar.min_azimuth(), -0.5236);
        assert_relative_eq!(sonar.max_azimuth(), 0.5236);
        Ok(())
    }

    #[test]
    fn test_sonar_geometry_invalid() {
        assert!(matches!(
            SonarGeometry::new(5.0, 5.0, 1.0),
            Err(AcTagError::InvalidRange(..))
        ));
        assert!(matches!(
            SonarGeometry::new(0.0, 5.0, 1.0),
            Err(AcTagError::InvalidRange(..))
        ));
        assert!(matches!(
            SonarGeometry::new(f64::NAN, 5.0, 1.0),
            Err(AcTagError::InvalidRange(..))
        ));
        assert!(matches!(
            SonarGeometry::new(0.1, 5.0, 0.0),
            Err(AcTagError::InvalidAperture(_))
        ));
        assert!(matches!(
            SonarGeometry::new(0.1, 5.0, f64::INFINITY),
            Err(AcTagError::InvalidAperture(_))
        ));
        assert!(matches!(
            SonarGeometry::new(0.1, 5.0, f64::NAN),
            Err(AcTagError::InvalidAperture(_))
        ));
        assert!(serde_json::from_str::<SonarGeometry>(
            r#"{"min_range": 2.0, "max_range": 1.0, "horizontal_aperture": 1.0}"#
        )
        .is_err());
    }

    #[test]
    fn test_polar_map() -> Result<(), Box<dyn std::error::Error>> {
        let sonar = SonarGeometry::new(1.0, 5.0, 1.0)?;
        let map = PolarMap::new(&sonar, [3, 5].into());

        assert_eq!(map.ranges(), &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(map.azimuths(), &[0.5, 0.0, -0.5]);

        let p = map.polar(Point2::new(4.0, 0.0));
        assert_relative_eq!(p.range, 1.0);
        assert_relative_eq!(p.azimuth, 0.5);

        let p = map.polar(Point2::new(1.5, 1.5));
        assert_relative_eq!(p.range, 3.5);
        assert_relative_eq!(p.azimuth, -0.25);

        Ok(())
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(1.0, 0.0, 0).is_empty());
        assert_eq!(linspace(1.0, 0.0, 1), vec![1.0]);
        assert_eq!(linspace(1.0, 0.0, 3), vec![1.0, 0.5, 0.0]);
    }
}
