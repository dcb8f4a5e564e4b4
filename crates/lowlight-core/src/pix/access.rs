//! Pixel access functions

use super::{Pix, PixMut, SAMPLES_PER_PIXEL};
use crate::error::{Error, Result};

#[inline]
fn offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * SAMPLES_PER_PIXEL
}

impl Pix {
    /// Get the RGB value at (x, y), or `None` if out of bounds.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_rgb_unchecked(x, y))
    }

    /// Get the RGB value at (x, y) without a bounds check on x.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the buffer.
    #[inline]
    pub fn get_rgb_unchecked(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let i = offset(self.width(), x, y);
        let d = self.data();
        (d[i], d[i + 1], d[i + 2])
    }

    /// Get the largest of the three channels at (x, y).
    #[inline]
    pub fn max_component(&self, x: u32, y: u32) -> Option<u8> {
        self.get_rgb(x, y).map(|(r, g, b)| r.max(g).max(b))
    }
}

impl PixMut {
    /// Get the RGB value at (x, y), or `None` if out of bounds.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = offset(self.width(), x, y);
        let d = self.data();
        Some((d[i], d[i + 1], d[i + 2]))
    }

    /// Set the RGB value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if (x, y) lies outside the image.
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            let len = self.width() as usize * self.height() as usize;
            return Err(Error::IndexOutOfBounds {
                index: y as usize * self.width() as usize + x as usize,
                len,
            });
        }
        let i = offset(self.width(), x, y);
        self.data_mut()[i..i + SAMPLES_PER_PIXEL].copy_from_slice(&[r, g, b]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_rgb() {
        let mut pm = Pix::new(3, 2).unwrap().to_mut();
        pm.set_rgb(2, 1, 10, 20, 30).unwrap();
        assert_eq!(pm.get_rgb(2, 1), Some((10, 20, 30)));
        let pix: Pix = pm.into();
        assert_eq!(pix.get_rgb(2, 1), Some((10, 20, 30)));
        assert_eq!(pix.max_component(2, 1), Some(30));
        assert_eq!(pix.get_rgb(3, 0), None);
    }

    #[test]
    fn test_set_rgb_out_of_bounds() {
        let mut pm = Pix::new(3, 2).unwrap().to_mut();
        assert!(pm.set_rgb(0, 2, 1, 1, 1).is_err());
    }
}
