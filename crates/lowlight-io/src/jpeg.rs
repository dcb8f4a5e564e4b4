//! JPEG image format support
//!
//! Reads JPEG images with the `jpeg-decoder` crate and writes baseline
//! JFIF with `jpeg-encoder`. Grayscale JPEGs are expanded to RGB.

use crate::{IoError, IoResult};
use lowlight_core::{ImageFormat, Pix};
use std::io::{Read, Write};

/// Default JPEG quality used by [`crate::write_image`].
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// # Returns
/// An RGB `Pix`. 8-bit grayscale streams are expanded; CMYK is rejected.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;
    let pix = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => Pix::from_raw_rgb(width, height, pixels)?,
        jpeg_decoder::PixelFormat::L8 => Pix::from_gray(width, height, &pixels)?,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(ImageFormat::Jpeg);
    Ok(pix_mut.into())
}

/// Write a JPEG image with the given quality (1..=100).
///
/// # Arguments
/// * `pix`     - The image to encode; both sides must fit in `u16`
/// * `writer`  - Destination writer
/// * `quality` - Encoder quality, clamped to `1..=100`
///
/// # See also
/// [`DEFAULT_JPEG_QUALITY`] is what [`crate::write_image`] passes.
pub fn write_jpeg<W: Write>(pix: &Pix, mut writer: W, quality: u8) -> IoResult<()> {
    let width = u16::try_from(pix.width())
        .map_err(|_| IoError::EncodeError(format!("JPEG width {} too large", pix.width())))?;
    let height = u16::try_from(pix.height())
        .map_err(|_| IoError::EncodeError(format!("JPEG height {} too large", pix.height())))?;

    let encoder = jpeg_encoder::Encoder::new(&mut writer, quality.clamp(1, 100));
    encoder
        .encode(pix.data(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))
}
