//! lowlight-io - Image I/O for the brightening pipeline
//!
//! Decodes on-disk images into the 8-bit RGB [`Pix`] the core consumes and
//! encodes enhanced results back. Formats are gated behind cargo features:
//!
//! | Format | Feature      | Read | Write |
//! |--------|--------------|------|-------|
//! | PNG    | `png-format` | yes  | yes   |
//! | JPEG   | `jpeg`       | yes  | yes   |
//! | PNM    | `pnm`        | P5/P6| P6    |
//! | BMP    | `bmp`        | yes  | 24-bit|

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes};
pub use lowlight_core::ImageFormat;

use lowlight_core::Pix;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Read an image from a file, detecting the format from its magic number.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let data = std::fs::read(path.as_ref())?;
    read_image_mem(&data)
}

/// Read an image from memory, detecting the format from its magic number.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    let format = detect_format_from_bytes(data)?;
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(Cursor::new(data)),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(BufReader::new(Cursor::new(data))),
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(Cursor::new(data)),
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write an image to a file in the given format.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_image_to(pix, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into memory in the given format.
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_image_to(pix, &mut buf, format)?;
    Ok(buf)
}

/// Byte length of a `width * height * bytes_per_pixel` raster.
///
/// Fails with [`IoError::InvalidData`] instead of overflowing on corrupt
/// headers.
pub(crate) fn raster_len(width: u32, height: u32, bytes_per_pixel: usize) -> IoResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(bytes_per_pixel))
        .ok_or_else(|| {
            IoError::InvalidData(format!(
                "image dimensions {}x{} overflow the address space",
                width, height
            ))
        })
}

/// Read exactly `len` bytes, growing the buffer only as data arrives.
///
/// A header that claims more pixels than the stream holds fails with
/// `UnexpectedEof` without allocating the claimed size up front.
pub(crate) fn read_raster<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(len as u64).read_to_end(&mut data)?;
    if data.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, found {}", len, data.len()),
        ));
    }
    Ok(data)
}

fn write_image_to<W: Write>(pix: &Pix, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(pix, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(pix, writer, jpeg::DEFAULT_JPEG_QUALITY),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(pix, writer),
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(pix, writer),
        other => Err(IoError::UnsupportedFormat(format!(
            "cannot write {:?}",
            other
        ))),
    }
}
