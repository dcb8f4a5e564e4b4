//! PIX - The RGB image container
//!
//! `Pix` holds a decoded 8-bit-per-channel RGB raster, the only pixel
//! layout the brightening pipeline consumes and produces.
//!
//! # Pixel layout
//!
//! - Samples are stored interleaved as `R, G, B` bytes
//! - Rows are packed with no padding; the pixel at (x, y) starts at byte
//!   `3 * (y * width + x)`
//!
//! # Ownership model
//!
//! `Pix` uses `Arc` for efficient cloning (shared ownership).
//! To modify pixel data, convert to `PixMut` via [`Pix::try_into_mut`]
//! or [`Pix::to_mut`], then convert back with `Into<Pix>`.

mod access;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Number of samples stored per pixel.
pub const SAMPLES_PER_PIXEL: usize = 3;

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// JFIF JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// PNM format (P5 / P6)
    Pnm,
    /// Windows BMP format
    Bmp,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pnm => "pnm",
            Self::Bmp => "bmp",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "pnm" | "ppm" | "pgm" => Some(Self::Pnm),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Internal PIX data
#[derive(Debug)]
struct PixData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Input file format
    informat: ImageFormat,
    /// Interleaved RGB samples
    data: Vec<u8>,
}

impl PixData {
    fn duplicate(&self) -> Self {
        PixData {
            width: self.width,
            height: self.height,
            informat: self.informat,
            data: self.data.clone(),
        }
    }
}

/// PIX - RGB image container
///
/// # Examples
///
/// ```
/// use lowlight_core::Pix;
///
/// let pix = Pix::new(640, 480).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.height(), 480);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new black image with the specified dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = Self::byte_len(width, height)?;
        Ok(Self::from_parts(width, height, vec![0u8; len]))
    }

    /// Create a new image filled with one colour.
    pub fn new_with_rgb(width: u32, height: u32, r: u8, g: u8, b: u8) -> Result<Self> {
        let len = Self::byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / SAMPLES_PER_PIXEL {
            data.extend_from_slice(&[r, g, b]);
        }
        Ok(Self::from_parts(width, height, data))
    }

    /// Wrap an interleaved RGB buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::NullInput`] if `data` is empty
    /// - [`Error::InvalidDimension`] if width or height is 0
    /// - [`Error::BufferSizeMismatch`] if `data.len() != width * height * 3`
    pub fn from_raw_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::NullInput("pixel data"));
        }
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(width, height, data))
    }

    /// Build an RGB image from a single 8-bit gray plane.
    pub fn from_gray(width: u32, height: u32, gray: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if gray.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: gray.len(),
            });
        }
        let data = gray.iter().flat_map(|&v| [v, v, v]).collect();
        Self::from_raw_rgb(width, height, data)
    }

    fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        Pix {
            inner: Arc::new(PixData {
                width,
                height,
                informat: ImageFormat::Unknown,
                data,
            }),
        }
    }

    /// Byte length of a packed RGB raster.
    fn byte_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(SAMPLES_PER_PIXEL))
            .ok_or(Error::InvalidDimension { width, height })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Get the input file format.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// Get the raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get the samples of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.inner.width as usize * SAMPLES_PER_PIXEL;
        let start = y as usize * stride;
        &self.inner.data[start..start + stride]
    }

    /// Check whether two images have the same width and height.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Create a deep copy of this PIX.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy.
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new(self.inner.duplicate()),
        }
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Create a mutable copy of this PIX.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: self.inner.duplicate(),
        }
    }
}

/// Mutable PIX
///
/// Allows modification of image data. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the input file format.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// Set the input file format.
    pub fn set_informat(&mut self, format: ImageFormat) {
        self.inner.informat = format;
    }

    /// Get the raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get mutable access to the raw interleaved samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}
