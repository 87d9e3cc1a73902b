/// Errors that can occur when working with AcTag decoding.
#[derive(Debug, thiserror::Error)]
pub enum AcTagError {
    /// Error related to image.
    #[error(transparent)]
    ImageError(#[from] actag_image::ImageError),

    /// The number of data bits must be a positive multiple of 4.
    #[error("The number of data bits ({0}) must be a positive multiple of 4")]
    InvalidDataBits(usize),

    /// The family source did not yield any base codeword.
    #[error("The tag family contains no codewords")]
    EmptyFamily,

    /// A raw codeword does not have `data_bits` entries.
    #[error("Codeword {index} has {got} bits, expected {expected}")]
    InvalidCodewordLength {
        /// Index of the codeword in the family source.
        index: usize,
        /// The number of data bits of the family.
        expected: usize,
        /// The length of the offending codeword.
        got: usize,
    },

    /// A raw codeword contains a value other than 0 or 1.
    #[error("Codeword {index} contains the non-binary value {value}")]
    InvalidCodewordBit {
        /// Index of the codeword in the family source.
        index: usize,
        /// The offending value.
        value: u8,
    },

    /// The observed bit pattern length does not match the family.
    #[error("Observed {got} bits, but the tag family has {expected} data bits")]
    ObservedLengthMismatch {
        /// The number of data bits of the family.
        expected: usize,
        /// The number of observed bits.
        got: usize,
    },

    /// A quad must have exactly 4 corners.
    #[error("A quad must have exactly 4 corners, got {0}")]
    InvalidQuad(usize),

    /// The minimum range must be positive and below the maximum range.
    #[error("Invalid sonar range: min_range ({0}) must be positive and smaller than max_range ({1})")]
    InvalidRange(f64, f64),

    /// The horizontal aperture must be positive.
    #[error("Invalid sonar horizontal aperture ({0}), it must be positive")]
    InvalidAperture(f64),

    /// The physical tag size must be positive.
    #[error("Invalid tag size ({0}), it must be positive")]
    InvalidTagSize(f64),

    /// The tag family name could not be parsed.
    #[error("Invalid tag family name `{0}`, expected the form `<prefix><data_bits>h<hamming_distance>`")]
    InvalidFamilyName(String),

    /// The requested bit corrections exceed what the family hamming distance allows.
    #[error("Bit corrections allowed has been set to {requested}, but the tag family only supports up to {max}")]
    TooManyBitCorrections {
        /// The requested number of bit corrections.
        requested: usize,
        /// The maximum number of bit corrections for the family.
        max: usize,
    },

    /// The family specification and the family table disagree on the number of data bits.
    #[error("The tag family spec has {spec} data bits but the family table has {table}")]
    FamilyMismatch {
        /// Data bits of the spec.
        spec: usize,
        /// Data bits of the table.
        table: usize,
    },

    /// The image to decode has no pixels.
    #[error("Cannot decode tags in an empty image")]
    EmptyImage,

    /// The local thread pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}
