/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when the rows of a nested buffer have different lengths.
    #[error("Row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Number of columns of the first row.
        expected: usize,
        /// Number of columns of the offending row.
        got: usize,
    },

    /// Error when a pixel coordinate is outside the image.
    #[error("Pixel ({0}, {1}) is out of bounds")]
    PixelOutOfBounds(usize, usize),
}
