use actag_image::Image;
use serde::{Deserialize, Serialize};

use crate::{
    errors::AcTagError,
    family::{pixels_across, MatchResult, TagFamilySpec, TagFamilyTable},
    homography::Homography,
    parallel::{map_items, ExecutionStrategy},
    sonar::{PolarMap, SonarGeometry},
    utils::{BinaryPixel, PixelCoord, Point2, PolarPoint, Quad},
};

/// The pixel locations of the data bits of a candidate tag, in codeword bit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBitLocations(Vec<PixelCoord>);

impl DataBitLocations {
    /// The number of sampled bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no locations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The locations as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[PixelCoord] {
        &self.0
    }

    /// Iterates over the locations.
    pub fn iter(&self) -> std::slice::Iter<'_, PixelCoord> {
        self.0.iter()
    }

    /// Returns true if every location lies inside a `height x width` image.
    pub fn in_bounds(&self, height: usize, width: usize) -> bool {
        self.0.iter().all(|p| p.in_bounds(height, width).is_some())
    }
}

/// A tag decoded from a candidate quad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTag {
    /// The tag ID within its family.
    pub tag_id: usize,
    /// The number of corrected bits.
    pub hamming: usize,
    /// The number of clockwise quarter turns of the tag in the image.
    pub rotation_steps: usize,
    /// Whether the tag was seen mirrored.
    pub is_reflected: bool,
    /// The tag corners in image space, starting at the top-left corner of the
    /// printed tag and going clockwise around it.
    pub corners: [Point2; 4],
    /// The `(range, azimuth)` of each corner, in the same order as `corners`.
    pub polar_corners: [PolarPoint; 4],
}

/// Returns the border sampling grid of a tag with `pixels_across` cells per side, in tag space.
///
/// The grid walks the outer ring of cells clockwise at half-integer offsets: the top
/// row left to right, the right column top to bottom, the bottom row right to left
/// and the left column bottom to top, for `4 * pixels_across - 4` samples in total.
pub fn border_sample_grid(pixels_across: usize) -> Vec<Point2> {
    let p = pixels_across;
    let last = p as f64 - 0.5;
    let mut grid = Vec::with_capacity((4 * p).saturating_sub(4));

    // top
    grid.extend((0..p).map(|i| Point2::new(0.5, 0.5 + i as f64)));
    // right
    grid.extend((1..p.saturating_sub(1)).map(|i| Point2::new(0.5 + i as f64, last)));
    // bottom
    grid.extend((0..p).map(|i| Point2::new(last, last - i as f64)));
    // left
    grid.extend((1..p.saturating_sub(1)).map(|i| Point2::new(last - i as f64, 0.5)));

    grid
}

/// Computes where the data bits of a tag inside `quad` should be sampled.
///
/// The quad corners are matched to the canonical corners of the inner white square,
/// and the border sampling grid is mapped through the resulting homography and
/// rounded to the nearest pixel. Location `j` is where bit `j` of a codeword of the
/// family table is expected.
pub fn compute_data_bit_locations(quad: &Quad, spec: &TagFamilySpec) -> DataBitLocations {
    data_bit_locations(quad, spec.pixels_across())
}

fn data_bit_locations(quad: &Quad, pixels_across: usize) -> DataBitLocations {
    let homography = Homography::from_quad(quad, pixels_across);

    let locations = border_sample_grid(pixels_across)
        .into_iter()
        .map(|p| {
            let p = homography.project(p);
            PixelCoord {
                row: round_to_pixel(p.row),
                col: round_to_pixel(p.col),
            }
        })
        .collect();

    DataBitLocations(locations)
}

/// Rounds half to even, sending non-finite values far outside any image.
#[inline]
fn round_to_pixel(v: f64) -> i64 {
    if v.is_finite() {
        v.round_ties_even() as i64
    } else {
        i64::MIN
    }
}

/// Reorders the corners of `quad` so that they follow the printed orientation of the matched tag.
///
/// For a tag rotated by `k` quarter turns, corner `c` of the tag is corner `c - k` of the
/// quad. For a mirrored tag the quad is walked the other way round, so corner `c` of the
/// tag is corner `k - c` of the quad.
pub fn reorder_corners(quad: &Quad, m: &MatchResult) -> [Point2; 4] {
    let k = m.rotation_steps % 4;
    if m.is_reflected {
        let mut corners: [Point2; 4] = std::array::from_fn(|c| quad.corners[(c + k) % 4]);
        corners.swap(1, 3);
        corners
    } else {
        quad.rolled(k)
    }
}

/// Decodes the tags encoded in a single candidate quad.
///
/// # Arguments
///
/// * `image` - The binarized sonar image.
/// * `quad` - The candidate quad.
/// * `locations` - The data bit locations of the quad, see [`compute_data_bit_locations`].
/// * `table` - The family table to match against.
/// * `max_hamming` - The number of bit errors to tolerate.
/// * `polar_map` - The polar map of the image.
///
/// # Returns
///
/// One [`DecodedTag`] per codeword within `max_hamming` bits of the observed pattern, in
/// table order. The result is empty if any location falls outside the image, since the
/// tag is then partially hidden.
pub fn decode_quad<T: BinaryPixel>(
    image: &Image<T>,
    quad: &Quad,
    locations: &DataBitLocations,
    table: &TagFamilyTable,
    max_hamming: usize,
    polar_map: &PolarMap,
) -> Result<Vec<DecodedTag>, AcTagError> {
    let observed = locations
        .iter()
        .map(|p| {
            let (row, col) = p.in_bounds(image.height(), image.width())?;
            image.get(row, col).map(BinaryPixel::bit)
        })
        .collect::<Option<Vec<u8>>>();

    let Some(observed) = observed else {
        log::trace!("quad {:?} samples outside the image, skipping", quad.corners);
        return Ok(Vec::new());
    };

    let decoded = table
        .find_matches(&observed, max_hamming)?
        .into_iter()
        .map(|m| {
            let corners = reorder_corners(quad, &m);
            DecodedTag {
                tag_id: m.tag_id,
                hamming: m.hamming,
                rotation_steps: m.rotation_steps,
                is_reflected: m.is_reflected,
                corners,
                polar_corners: corners.map(|c| polar_map.polar(c)),
            }
        })
        .collect::<Vec<_>>();

    if decoded.len() > 1 {
        log::debug!(
            "quad {:?} matches {} codewords within {} bits",
            quad.corners,
            decoded.len(),
            max_hamming
        );
    }

    Ok(decoded)
}

/// Decodes all the tags found in the candidate quads of a frame.
///
/// Quads which sample outside the image or do not match any codeword are skipped.
/// The tags are returned in quad order, and in table order within a quad.
///
/// # Errors
///
/// Returns an error if the image is empty or if `spec` and `table` disagree on the
/// number of data bits.
pub fn decode_all<T: BinaryPixel>(
    image: &Image<T>,
    quads: &[Quad],
    sonar: &SonarGeometry,
    spec: &TagFamilySpec,
    table: &TagFamilyTable,
    max_hamming: usize,
) -> Result<Vec<DecodedTag>, AcTagError> {
    decode_all_with_strategy(
        image,
        quads,
        sonar,
        spec,
        table,
        max_hamming,
        ExecutionStrategy::Serial,
    )
}

/// Same as [`decode_all`], decoding the quads following `strategy`.
pub fn decode_all_with_strategy<T: BinaryPixel>(
    image: &Image<T>,
    quads: &[Quad],
    sonar: &SonarGeometry,
    spec: &TagFamilySpec,
    table: &TagFamilyTable,
    max_hamming: usize,
    strategy: ExecutionStrategy,
) -> Result<Vec<DecodedTag>, AcTagError> {
    if image.size().is_empty() {
        return Err(AcTagError::EmptyImage);
    }

    if spec.data_bits() != table.data_bits() {
        return Err(AcTagError::FamilyMismatch {
            spec: spec.data_bits(),
            table: table.data_bits(),
        });
    }

    let polar_map = PolarMap::new(sonar, image.size());
    let pixels_across = pixels_across(table.data_bits());

    let per_quad = map_items(quads, strategy, |quad| {
        let locations = data_bit_locations(quad, pixels_across);
        decode_quad(image, quad, &locations, table, max_hamming, &polar_map)
    })?;

    let mut decoded = Vec::new();
    for tags in per_quad {
        decoded.extend(tags?);
    }

    log::debug!(
        "decoded {} tags from {} candidate quads",
        decoded.len(),
        quads.len()
    );

    Ok(decoded)
}
