use serde::{Deserialize, Serialize};

use crate::errors::AcTagError;

mod table;

pub use table::{reflect, rotate, MatchResult, TagFamilyTable};

/// Returns the number of grid cells across a tag with `data_bits` border bits.
///
/// The family table and the bit sampler both derive the tag grid from this
/// function, so sample `j` always lines up with bit `j` of a codeword.
#[inline]
pub const fn pixels_across(data_bits: usize) -> usize {
    (data_bits + 4) / 4
}

/// Checks that `data_bits` is a positive multiple of 4.
pub(crate) fn validate_data_bits(data_bits: usize) -> Result<(), AcTagError> {
    if data_bits == 0 || data_bits % 4 != 0 {
        return Err(AcTagError::InvalidDataBits(data_bits));
    }
    Ok(())
}

/// Identifies an AcTag family and the physical size of its tags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTagFamilySpec")]
pub struct TagFamilySpec {
    data_bits: usize,
    hamming_distance: usize,
    tag_size: f64,
}

#[derive(Deserialize)]
struct RawTagFamilySpec {
    data_bits: usize,
    hamming_distance: usize,
    tag_size: f64,
}

impl TryFrom<RawTagFamilySpec> for TagFamilySpec {
    type Error = AcTagError;

    fn try_from(raw: RawTagFamilySpec) -> Result<Self, Self::Error> {
        Self::new(raw.data_bits, raw.hamming_distance, raw.tag_size)
    }
}

impl TagFamilySpec {
    /// Creates a new family specification.
    ///
    /// # Arguments
    ///
    /// * `data_bits` - The number of data bits around the tag border, a positive multiple of 4.
    /// * `hamming_distance` - The minimum Hamming distance between codewords of the family.
    /// * `tag_size` - The edge length of the inner white square, in meters.
    ///
    /// # Errors
    ///
    /// Returns [`AcTagError::InvalidDataBits`] or [`AcTagError::InvalidTagSize`] for invalid values.
    pub fn new(
        data_bits: usize,
        hamming_distance: usize,
        tag_size: f64,
    ) -> Result<Self, AcTagError> {
        validate_data_bits(data_bits)?;

        if tag_size.is_nan() || tag_size <= 0.0 {
            return Err(AcTagError::InvalidTagSize(tag_size));
        }

        Ok(Self {
            data_bits,
            hamming_distance,
            tag_size,
        })
    }

    /// Creates a family specification from a family name such as `AcTag24h10`.
    ///
    /// Anything after the first `_` is ignored, so `AcTag24h10_v2` is accepted as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use actag::family::TagFamilySpec;
    ///
    /// let spec = TagFamilySpec::from_name("AcTag24h10", 0.13).unwrap();
    ///
    /// assert_eq!(spec.data_bits(), 24);
    /// assert_eq!(spec.hamming_distance(), 10);
    /// assert_eq!(spec.pixels_across(), 7);
    /// ```
    pub fn from_name(name: &str, tag_size: f64) -> Result<Self, AcTagError> {
        let (data_bits, hamming_distance) = parse_family_name(name)?;
        Self::new(data_bits, hamming_distance, tag_size)
    }

    /// The number of data bits of the family.
    #[inline]
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// The minimum Hamming distance between codewords of the family.
    #[inline]
    pub fn hamming_distance(&self) -> usize {
        self.hamming_distance
    }

    /// The edge length of the inner white square, in meters.
    #[inline]
    pub fn tag_size(&self) -> f64 {
        self.tag_size
    }

    /// The diagonal of the inner white square, in meters.
    #[inline]
    pub fn tag_diag(&self) -> f64 {
        std::f64::consts::SQRT_2 * self.tag_size
    }

    /// The area of the inner white square, in square meters.
    #[inline]
    pub fn tag_area(&self) -> f64 {
        self.tag_size * self.tag_size
    }

    /// The number of grid cells across the tag.
    #[inline]
    pub fn pixels_across(&self) -> usize {
        pixels_across(self.data_bits)
    }

    /// The largest number of bit errors that can be corrected without ambiguity.
    pub fn max_bit_corrections(&self) -> usize {
        self.hamming_distance.saturating_sub(1) / 2
    }
}

/// Parses `<prefix><data_bits>h<hamming_distance>[_suffix]` into its two integers.
///
/// The prefix is everything before the first digit, usually `AcTag`.
///
/// # Errors
///
/// Returns [`AcTagError::InvalidFamilyName`] if the name is malformed, and
/// [`AcTagError::InvalidDataBits`] if the bit count is not a positive multiple of 4.
pub fn parse_family_name(name: &str) -> Result<(usize, usize), AcTagError> {
    let invalid = || AcTagError::InvalidFamilyName(name.to_string());

    let family = name.split('_').next().unwrap_or(name);
    let (data_bits, hamming_distance) = family
        .find(|c: char| c.is_ascii_digit())
        .and_then(|start| family[start..].split_once('h'))
        .ok_or_else(invalid)?;

    let data_bits: usize = data_bits.parse().map_err(|_| invalid())?;
    let hamming_distance: usize = hamming_distance.parse().map_err(|_| invalid())?;

    validate_data_bits(data_bits)?;

    Ok((data_bits, hamming_distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_family_spec_derived() -> Result<(), Box<dyn std::error::Error>> {
        let spec = TagFamilySpec::new(24, 10, 0.5)?;

        assert_eq!(spec.pixels_across(), 7);
        assert_relative_eq!(spec.tag_area(), 0.25);
        assert_relative_eq!(spec.tag_diag(), 0.5 * 2f64.sqrt());
        assert_eq!(spec.max_bit_corrections(), 4);

        assert_eq!(TagFamilySpec::new(16, 9, 0.5)?.max_bit_corrections(), 4);
        assert_eq!(TagFamilySpec::new(8, 0, 0.5)?.max_bit_corrections(), 0);

        Ok(())
    }

    #[test]
    fn test_family_spec_invalid() {
        assert!(matches!(
            TagFamilySpec::new(26, 10, 0.5),
            Err(AcTagError::InvalidDataBits(26))
        ));
        assert!(matches!(
            TagFamilySpec::new(0, 10, 0.5),
            Err(AcTagError::InvalidDataBits(0))
        ));
        assert!(matches!(
            TagFamilySpec::new(24, 10, 0.0),
            Err(AcTagError::InvalidTagSize(_))
        ));
        assert!(matches!(
            TagFamilySpec::new(24, 10, f64::NAN),
            Err(AcTagError::InvalidTagSize(_))
        ));
    }

    #[test]
    fn test_parse_family_name() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(parse_family_name("AcTag24h10")?, (24, 10));
        assert_eq!(parse_family_name("AcTag16h6_inverted")?, (16, 6));

        assert_eq!(parse_family_name("FakeTag24h10")?, (24, 10));
        assert_eq!(parse_family_name("36h12")?, (36, 12));

        for name in ["AcTagNotReal", "AcTagh10", "AcTag24h", "AcTag24x10", ""] {
            assert!(
                matches!(
                    parse_family_name(name),
                    Err(AcTagError::InvalidFamilyName(_))
                ),
                "{name}"
            );
        }

        assert!(matches!(
            parse_family_name("AcTag25h10"),
            Err(AcTagError::InvalidDataBits(25))
        ));

        Ok(())
    }

    #[test]
    fn test_family_spec_deserialize() -> Result<(), Box<dyn std::error::Error>> {
        let spec: TagFamilySpec =
            serde_json::from_str(r#"{"data_bits": 24, "hamming_distance": 10, "tag_size": 0.13}"#)?;
        assert_eq!(spec, TagFamilySpec::new(24, 10, 0.13)?);

        let invalid = serde_json::from_str::<TagFamilySpec>(
            r#"{"data_bits": 25, "hamming_distance": 10, "tag_size": 0.13}"#,
        );
        assert!(invalid.is_err());

        Ok(())
    }
}
