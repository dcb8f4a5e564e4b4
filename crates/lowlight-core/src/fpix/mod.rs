//! FPix - Floating-point scalar field
//!
//! `FPix` is a 2D array of `f32` values. The brightening pipeline uses it
//! for every per-call intermediate: the brightness proxy, the unnormalized
//! blur passes, the smoothed brightness and the gain map.
//!
//! # Examples
//!
//! ```
//! use lowlight_core::FPix;
//!
//! let mut fpix = FPix::new(100, 100).unwrap();
//! fpix.set_pixel(10, 20, 0.5).unwrap();
//! assert_eq!(fpix.get_pixel(10, 20).unwrap(), 0.5);
//! ```

use crate::error::{Error, Result};

/// Floating-point field
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The value at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FPix {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<f32>,
}

impl FPix {
    /// Create a new FPix with all values set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, 0.0)
    }

    /// Create a new FPix with all values set to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(FPix {
            width,
            height,
            data: vec![value; size],
        })
    }

    /// Create a FPix from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(FPix {
            width,
            height,
            data,
        })
    }

    /// Create an all-zero field with the same dimensions as `self`.
    pub fn create_template(&self) -> FPix {
        FPix {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
        }
    }

    /// Get the width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<f32> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y as usize) * (self.width as usize) + (x as usize),
                len: self.data.len(),
            });
        }
        Ok(self.get_pixel_unchecked(x, y))
    }

    /// Set the value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y as usize) * (self.width as usize) + (x as usize),
                len: self.data.len(),
            });
        }
        self.set_pixel_unchecked(x, y, value);
        Ok(())
    }

    /// Get the value at (x, y) without bounds checking on x
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Set the value at (x, y) without bounds checking on x
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: f32) {
        self.data[(y as usize) * (self.width as usize) + (x as usize)] = value;
    }

    /// Get the raw data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the raw data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Minimum value, or `None` if any value is NaN.
    pub fn min_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .try_fold(f32::INFINITY, |acc, v| (!v.is_nan()).then(|| acc.min(v)))
    }

    /// Maximum value, or `None` if any value is NaN.
    pub fn max_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .try_fold(f32::NEG_INFINITY, |acc, v| (!v.is_nan()).then(|| acc.max(v)))
    }

    /// Mean of all values
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }
}
