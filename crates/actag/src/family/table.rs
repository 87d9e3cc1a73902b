use crate::errors::AcTagError;

use super::{pixels_across, validate_data_bits};

/// Returns `codeword` rotated clockwise by `steps` quarter turns.
///
/// A quarter turn moves the bit at position `i` to `i - len/4 (mod len)`.
pub fn rotate(codeword: &[u8], steps: usize) -> Vec<u8> {
    let mut rotated = codeword.to_vec();
    if !codeword.is_empty() {
        rotated.rotate_left((steps * codeword.len() / 4) % codeword.len());
    }
    rotated
}

/// Returns the mirror image of `codeword`.
///
/// Position 0 is kept in place and positions `1..len` are reversed.
pub fn reflect(codeword: &[u8]) -> Vec<u8> {
    let mut reflected = codeword.to_vec();
    if reflected.len() > 1 {
        reflected[1..].reverse();
    }
    reflected
}

/// A codeword of the family table within the Hamming budget of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// The tag ID, in `[0, base_count)`.
    pub tag_id: usize,
    /// The index of the matched codeword in the family table.
    pub index: usize,
    /// Whether the matched codeword is a mirrored variant.
    pub is_reflected: bool,
    /// The number of clockwise quarter turns of the matched codeword.
    pub rotation_steps: usize,
    /// The Hamming distance between the observation and the codeword.
    pub hamming: usize,
}

/// All codewords of an AcTag family, expanded with their rotations and reflections.
///
/// The codewords are stored in a single flat buffer in 8 blocks of `base_count`
/// entries: block 0 holds the base codewords, blocks 1 to 3 their rotations by
/// 1 to 3 quarter turns, and blocks 4 to 7 the reflections of blocks 0 to 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFamilyTable {
    data_bits: usize,
    base_count: usize,
    bits: Vec<u8>,
}

impl TagFamilyTable {
    /// Builds the family table from the base codewords of the family.
    ///
    /// # Arguments
    ///
    /// * `data_bits` - The number of data bits of the family, a positive multiple of 4.
    /// * `raw_codewords` - The base codewords, each `data_bits` values of 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `data_bits` is invalid, if there is no codeword, or if a
    /// codeword has the wrong length or a non-binary value.
    pub fn build<C: AsRef<[u8]>>(
        data_bits: usize,
        raw_codewords: &[C],
    ) -> Result<Self, AcTagError> {
        validate_data_bits(data_bits)?;

        if raw_codewords.is_empty() {
            return Err(AcTagError::EmptyFamily);
        }

        for (index, codeword) in raw_codewords.iter().enumerate() {
            let codeword = codeword.as_ref();
            if codeword.len() != data_bits {
                return Err(AcTagError::InvalidCodewordLength {
                    index,
                    expected: data_bits,
                    got: codeword.len(),
                });
            }
            if let Some(&value) = codeword.iter().find(|&&b| b > 1) {
                return Err(AcTagError::InvalidCodewordBit { index, value });
            }
        }

        let base_count = raw_codewords.len();
        let mut bits = Vec::with_capacity(8 * base_count * data_bits);

        (0..4).for_each(|steps| {
            raw_codewords.iter().for_each(|codeword| {
                bits.extend(rotate(codeword.as_ref(), steps));
            });
        });

        let reflected = bits
            .chunks_exact(data_bits)
            .flat_map(reflect)
            .collect::<Vec<_>>();
        bits.extend(reflected);

        log::debug!(
            "built tag family table: {} base codewords, {} entries of {} bits",
            base_count,
            8 * base_count,
            data_bits
        );

        Ok(Self {
            data_bits,
            base_count,
            bits,
        })
    }

    /// The number of data bits of every codeword.
    #[inline]
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// The number of tags in the family.
    #[inline]
    pub fn base_count(&self) -> usize {
        self.base_count
    }

    /// The number of grid cells across a tag of this family.
    #[inline]
    pub fn pixels_across(&self) -> usize {
        pixels_across(self.data_bits)
    }

    /// The number of codewords in the table, always `8 * base_count`.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len() / self.data_bits
    }

    /// Returns true if the table has no codewords. Never the case for a built table.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the codeword at `index`, or `None` if it is out of range.
    pub fn codeword(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.data_bits)?;
        self.bits.get(start..start + self.data_bits)
    }

    /// Iterates over all codewords in table order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.bits.chunks_exact(self.data_bits)
    }

    /// Describes the codeword at `index` as a match with the given Hamming distance.
    fn match_result(&self, index: usize, hamming: usize) -> MatchResult {
        let rotations_len = 4 * self.base_count;
        MatchResult {
            tag_id: index % self.base_count,
            index,
            is_reflected: index >= rotations_len,
            rotation_steps: (index % rotations_len) / self.base_count,
            hamming,
        }
    }

    /// Finds every codeword within `max_hamming` bit errors of `observed`.
    ///
    /// The matches are returned in ascending table order. An empty result is the
    /// normal outcome when nothing matches. More than one match is possible when
    /// `max_hamming` is large compared to the family Hamming distance, and all of
    /// them are returned.
    ///
    /// # Errors
    ///
    /// Returns [`AcTagError::ObservedLengthMismatch`] if `observed` is not `data_bits` long.
    pub fn find_matches(
        &self,
        observed: &[u8],
        max_hamming: usize,
    ) -> Result<Vec<MatchResult>, AcTagError> {
        if observed.len() != self.data_bits {
            return Err(AcTagError::ObservedLengthMismatch {
                expected: self.data_bits,
                got: observed.len(),
            });
        }

        let matches = self
            .iter()
            .enumerate()
            .filter_map(|(index, codeword)| {
                hamming_within(observed, codeword, max_hamming)
                    .map(|hamming| self.match_result(index, hamming))
            })
            .collect();

        Ok(matches)
    }
}

/// Returns the Hamming distance between `a` and `b` if it does not exceed `max`.
fn hamming_within(a: &[u8], b: &[u8], max: usize) -> Option<usize> {
    let mut distance = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            distance += 1;
            if distance > max {
                return None;
            }
        }
    }
    Some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b - b'0').collect()
    }

    #[test]
    fn test_rotate() {
        let codeword = bits("00000011");
        assert_eq!(rotate(&codeword, 0), codeword);
        assert_eq!(rotate(&codeword, 1), bits("00001100"));
        assert_eq!(rotate(&codeword, 2), bits("00110000"));
        assert_eq!(rotate(&codeword, 3), bits("11000000"));
    }

    #[test]
    fn test_rotate_closure() {
        let codeword = bits("101010111001001001010100");
        let mut rotated = codeword.clone();
        for _ in 0..4 {
            rotated = rotate(&rotated, 1);
        }
        assert_eq!(rotated, codeword);
        assert_eq!(rotate(&codeword, 4), codeword);
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(&bits("00000011")), bits("01100000"));
        assert_eq!(reflect(&bits("10110000")), bits("10000110"));

        let codeword = bits("110001111011010111011100");
        assert_eq!(reflect(&reflect(&codeword)), codeword);
    }

    #[test]
    fn test_build_layout() -> Result<(), Box<dyn std::error::Error>> {
        let base = [bits("00000011"), bits("00001001")];
        let table = TagFamilyTable::build(8, &base)?;

        assert_eq!(table.len(), 16);
        assert_eq!(table.base_count(), 2);
        assert_eq!(table.pixels_across(), 3);

        assert_eq!(table.codeword(0), Some(&base[0][..]));
        assert_eq!(table.codeword(1), Some(&base[1][..]));
        assert_eq!(table.codeword(2), Some(&rotate(&base[0], 1)[..]));
        assert_eq!(table.codeword(7), Some(&rotate(&base[1], 3)[..]));
        assert_eq!(table.codeword(8), Some(&reflect(&base[0])[..]));
        assert_eq!(table.codeword(11), Some(&reflect(&rotate(&base[1], 1))[..]));
        assert_eq!(table.codeword(16), None);

        Ok(())
    }

    #[test]
    fn test_build_size_invariant() -> Result<(), Box<dyn std::error::Error>> {
        for base_count in 1..6 {
            let base = (0..base_count)
                .map(|i| (0..12).map(|j| ((i + j) % 3 == 0) as u8).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            let table = TagFamilyTable::build(12, &base)?;
            assert_eq!(table.len(), 8 * base_count);
            assert_eq!(table.iter().count(), 8 * base_count);
        }
        Ok(())
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            TagFamilyTable::build(6, &[vec![0u8; 6]]),
            Err(AcTagError::InvalidDataBits(6))
        ));
        assert!(matches!(
            TagFamilyTable::build::<Vec<u8>>(8, &[]),
            Err(AcTagError::EmptyFamily)
        ));
        assert!(matches!(
            TagFamilyTable::build(8, &[vec![0u8; 8], vec![0u8; 7]]),
            Err(AcTagError::InvalidCodewordLength {
                index: 1,
                expected: 8,
                got: 7
            })
        ));
        assert!(matches!(
            TagFamilyTable::build(4, &[vec![0u8, 1, 2, 0]]),
            Err(AcTagError::InvalidCodewordBit { index: 0, value: 2 })
        ));
    }

    #[test]
    fn test_find_matches_exact() -> Result<(), Box<dyn std::error::Error>> {
        let base = [bits("00000011"), bits("00001001")];
        let table = TagFamilyTable::build(8, &base)?;

        let observed = reflect(&rotate(&base[1], 2));
        let matches = table.find_matches(&observed, 0)?;

        assert_eq!(
            matches,
            vec![MatchResult {
                tag_id: 1,
                index: 13,
                is_reflected: true,
                rotation_steps: 2,
                hamming: 0,
            }]
        );

        assert!(table.find_matches(&bits("11111111"), 1)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_find_matches_ambiguous() -> Result<(), Box<dyn std::error::Error>> {
        // the two base codewords are 2 bits apart and the observation is 1 bit from each
        let base = [bits("00000011"), bits("00001001")];
        let table = TagFamilyTable::build(8, &base)?;

        let matches = table.find_matches(&bits("00001011"), 1)?;

        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].tag_id, matches[0].hamming), (0, 1));
        assert_eq!((matches[1].tag_id, matches[1].hamming), (1, 1));

        Ok(())
    }

    #[test]
    fn test_find_matches_wrong_length() -> Result<(), Box<dyn std::error::Error>> {
        let table = TagFamilyTable::build(8, &[bits("00000011")])?;
        assert!(matches!(
            table.find_matches(&bits("0000"), 0),
            Err(AcTagError::ObservedLengthMismatch {
                expected: 8,
                got: 4
            })
        ));
        Ok(())
    }
}
