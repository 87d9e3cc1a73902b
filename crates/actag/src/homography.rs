use faer::{Mat, MatRef};

use crate::utils::{Point2, Quad};

/// Number of decimals kept in the estimated homography.
///
/// Rounding makes the integer sample locations independent of the linear algebra
/// backend used to compute the pseudo-inverse.
pub const HOMOGRAPHY_DECIMALS: i32 = 10;

/// A 3x3 projective transform between tag space and image space, stored row-major.
///
/// Points are `(row, col)` pairs on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography(pub [[f64; 3]; 3]);

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Estimates the transform taking the canonical inner-square corners of a tag
    /// with `pixels_across` grid cells onto the corners of `quad`.
    ///
    /// The result is rounded to [`HOMOGRAPHY_DECIMALS`] decimals.
    pub fn from_quad(quad: &Quad, pixels_across: usize) -> Self {
        Self::from_correspondences(&canonical_corners(pixels_across), &quad.corners)
            .rounded(HOMOGRAPHY_DECIMALS)
    }

    /// Solves `dst = H * src` in the least squares sense as `H = dst * pinv(src)`,
    /// with both point sets in homogeneous coordinates.
    ///
    /// The solution is exact when the two point sets are related by an affine transform.
    pub fn from_correspondences(src: &[Point2; 4], dst: &[Point2; 4]) -> Self {
        let homogeneous = |points: &[Point2; 4]| {
            Mat::<f64>::from_fn(3, 4, |i, j| match i {
                0 => points[j].row,
                1 => points[j].col,
                _ => 1.0,
            })
        };

        let src_mat = homogeneous(src);
        let dst_mat = homogeneous(dst);
        let src_pinv = pseudo_inverse(src_mat.as_ref());

        let mut h = [[0.0; 3]; 3];
        for (i, row) in h.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4)
                    .map(|k| dst_mat.read(i, k) * src_pinv.read(k, j))
                    .sum();
            }
        }

        Self(h)
    }

    /// Returns the transform with every coefficient rounded to `decimals` decimals.
    pub fn rounded(self, decimals: i32) -> Self {
        let scale = 10f64.powi(decimals);
        Self(self.0.map(|row| row.map(|v| (v * scale).round() / scale)))
    }

    /// Maps a point through the transform, dividing by the homogeneous coordinate.
    #[inline]
    pub fn project(&self, p: Point2) -> Point2 {
        let h = &self.0;
        let row = h[0][0] * p.row + h[0][1] * p.col + h[0][2];
        let col = h[1][0] * p.row + h[1][1] * p.col + h[1][2];
        let w = h[2][0] * p.row + h[2][1] * p.col + h[2][2];
        Point2::new(row / w, col / w)
    }
}

/// The corners of the inner white square of a tag in tag space, in the order the
/// quad corners are expected: `(2, 2)`, `(2, P-2)`, `(P-2, P-2)`, `(P-2, 2)`.
pub fn canonical_corners(pixels_across: usize) -> [Point2; 4] {
    let near = 2.0;
    let far = pixels_across as f64 - 2.0;
    [
        Point2::new(near, near),
        Point2::new(near, far),
        Point2::new(far, far),
        Point2::new(far, near),
    ]
}

/// Computes the Moore-Penrose pseudo-inverse of `mat` from its singular value decomposition.
///
/// Singular values below `eps * max(rows, cols) * s_max` are treated as zero.
pub fn pseudo_inverse(mat: MatRef<'_, f64>) -> Mat<f64> {
    let svd = mat.svd();
    let (u, s, v) = (svd.u(), svd.s_diagonal(), svd.v());

    let s_max = (0..s.nrows()).map(|k| s.read(k)).fold(0.0, f64::max);
    let tolerance = f64::EPSILON * mat.nrows().max(mat.ncols()) as f64 * s_max;

    Mat::from_fn(mat.ncols(), mat.nrows(), |i, j| {
        (0..s.nrows())
            .filter(|&k| s.read(k) > tolerance)
            .map(|k| v.read(i, k) * u.read(j, k) / s.read(k))
            .sum()
    })
}
