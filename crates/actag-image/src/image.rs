use crate::error::ImageError;

/// The extent of a sonar frame: `width` azimuth columns by `height` range rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSize {
    /// Returns true if the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// `[width, height]`, i.e. `[columns, rows]`.
impl From<[usize; 2]> for ImageSize {
    fn from([width, height]: [usize; 2]) -> Self {
        Self { width, height }
    }
}

/// Represents a single channel image with row-major pixel data.
///
/// Sonar frames are indexed by `(row, col)`: rows run along the range axis and
/// columns along the azimuth axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The row-major pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use actag_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20],
    /// ).unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.width * size.height {
            return Err(ImageError::InvalidDataLength(
                data.len(),
                size.width * size.height,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size filled with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use actag_image::{Image, ImageSize};
    ///
    /// let image = Image::from_size_val([4, 3].into(), 0u8);
    ///
    /// assert_eq!(image.size(), ImageSize { width: 4, height: 3 });
    /// assert_eq!(image.as_slice().len(), 12);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Self
    where
        T: Clone,
    {
        Self {
            size,
            data: vec![val; size.width * size.height],
        }
    }

    /// Create a new image from a nested buffer of rows.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::RaggedRows`] if the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ImageError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(ImageError::RaggedRows {
                    row,
                    expected: width,
                    got: values.len(),
                });
            }
            data.extend(values);
        }

        Self::new(ImageSize { width, height }, data)
    }

    /// Get the size of the image in pixels.
    #[inline]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the pixel data as a row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a mutable row-major slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get a reference to the pixel at `(row, col)`, or `None` if it is outside the image.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.size.height || col >= self.size.width {
            return None;
        }
        self.data.get(row * self.size.width + col)
    }

    /// Set the pixel at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelOutOfBounds`] if the coordinate is outside the image.
    pub fn set(&mut self, row: usize, col: usize, val: T) -> Result<(), ImageError> {
        if row >= self.size.height || col >= self.size.width {
            return Err(ImageError::PixelOutOfBounds(row, col));
        }
        self.data[row * self.size.width + col] = val;
        Ok(())
    }

    /// Iterate over the rows of the image.
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.size.width.max(1))
    }
}
