//! BMP image format support
//!
//! Reads uncompressed Windows Bitmap files and writes 24-bit BMP.
//! Palette images (1, 4 and 8 bpp) are expanded through their color table
//! and 32-bit pixels lose their fourth byte, so every read yields RGB.
//!
//! # See also
//! [`crate::read_image`] dispatches here on the `BM` magic.

use crate::{IoError, IoResult};
use lowlight_core::{ImageFormat, Pix};
use std::io::{Read, Write};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

#[inline]
fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

#[inline]
fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Skip `n` bytes of the stream.
fn skip<R: Read>(reader: &mut R, n: usize) -> IoResult<()> {
    let copied = std::io::copy(&mut reader.take(n as u64), &mut std::io::sink())?;
    if copied != n as u64 {
        return Err(IoError::InvalidData("truncated BMP header".to_string()));
    }
    Ok(())
}

/// Read a BMP image
///
/// # Arguments
/// * `reader` - Stream positioned at the `BM` signature
///
/// # Returns
/// An RGB [`Pix`] tagged [`ImageFormat::Bmp`]. Bottom-up and top-down
/// row orders are both accepted.
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;
    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let pixel_offset = le_u32(&file_header, 10) as usize;

    let mut info_header = [0u8; BMP_INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info_header)?;

    let header_size = le_u32(&info_header, 0);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {}",
            header_size
        )));
    }

    let width = i32::from_le_bytes([info_header[4], info_header[5], info_header[6], info_header[7]]);
    let height =
        i32::from_le_bytes([info_header[8], info_header[9], info_header[10], info_header[11]]);

    let planes = le_u16(&info_header, 12);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {}",
            planes
        )));
    }

    let bits_per_pixel = le_u16(&info_header, 14);
    let compression = le_u32(&info_header, 16);
    // 0 = BI_RGB, 3 = BI_BITFIELDS with the default masks
    if compression != 0 && compression != 3 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {}",
            compression
        )));
    }
    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24 | 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP bit depth: {}",
            bits_per_pixel
        )));
    }

    let top_down = height < 0;
    let width = width.unsigned_abs();
    let height = height.unsigned_abs();
    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "invalid BMP dimensions: {}x{}",
            width, height
        )));
    }

    skip(&mut reader, header_size as usize - BMP_INFO_HEADER_SIZE as usize)?;

    // Color table for palette images
    let palette: Vec<[u8; 3]> = if bits_per_pixel <= 8 {
        let colors_used = le_u32(&info_header, 32) as usize;
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 {
            max_colors
        } else {
            colors_used.min(max_colors)
        };
        let mut raw = vec![0u8; num_colors * 4];
        reader.read_exact(&mut raw)?;
        raw.chunks_exact(4).map(|c| [c[2], c[1], c[0]]).collect()
    } else {
        Vec::new()
    };

    let current_pos = BMP_FILE_HEADER_SIZE + header_size as usize + palette.len() * 4;
    if pixel_offset > current_pos {
        skip(&mut reader, pixel_offset - current_pos)?;
    }

    // BMP rows are 4-byte aligned
    let row_bits = crate::raster_len(width, 1, bits_per_pixel as usize)?;
    let row_stride = row_bits.div_ceil(32) * 4;
    let total = crate::raster_len(height, 1, row_stride)?;
    let raw = crate::read_raster(&mut reader, total)
        .map_err(|e| IoError::InvalidData(format!("truncated BMP raster: {}", e)))?;

    let lookup = |index: u8| -> IoResult<[u8; 3]> {
        palette.get(index as usize).copied().ok_or_else(|| {
            IoError::InvalidData(format!("palette index {} out of range", index))
        })
    };

    let row_len = crate::raster_len(width, 1, 3)?;
    let mut rgb = vec![0u8; crate::raster_len(width, height, 3)?];
    for (row, src) in raw.chunks_exact(row_stride).enumerate() {
        let y = if top_down { row } else { height as usize - 1 - row };
        let dst = &mut rgb[y * row_len..(y + 1) * row_len];
        for (x, px) in dst.chunks_exact_mut(3).enumerate() {
            let color = match bits_per_pixel {
                1 => lookup((src[x / 8] >> (7 - x % 8)) & 1)?,
                4 => lookup(if x % 2 == 0 { src[x / 2] >> 4 } else { src[x / 2] & 0xF })?,
                8 => lookup(src[x])?,
                24 => [src[x * 3 + 2], src[x * 3 + 1], src[x * 3]],
                _ => [src[x * 4 + 2], src[x * 4 + 1], src[x * 4]],
            };
            px.copy_from_slice(&color);
        }
    }

    let pix = Pix::from_raw_rgb(width, height, rgb)?;
    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(ImageFormat::Bmp);
    Ok(pix_mut.into())
}

/// Write a 24-bit bottom-up BMP image
pub fn write_bmp<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    let row_stride = (width as usize * 3).div_ceil(4) * 4;
    let pixel_data_size = row_stride * height as usize;
    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    let file_size = u32::try_from(pixel_offset + pixel_data_size)
        .map_err(|_| IoError::EncodeError("image too large for BMP".to_string()))?;

    // File header
    writer.write_all(b"BM")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(&[0u8; 4])?; // Reserved
    writer.write_all(&(pixel_offset as u32).to_le_bytes())?;

    // Info header
    writer.write_all(&BMP_INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?; // Bottom-up
    writer.write_all(&1u16.to_le_bytes())?; // Planes
    writer.write_all(&24u16.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // Compression
    writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?; // X pixels per meter
    writer.write_all(&0i32.to_le_bytes())?; // Y pixels per meter
    writer.write_all(&0u32.to_le_bytes())?; // Colors used
    writer.write_all(&0u32.to_le_bytes())?; // Important colors

    let mut row_buffer = vec![0u8; row_stride];
    for y in (0..height).rev() {
        for (dst, src) in row_buffer.chunks_exact_mut(3).zip(pix.row(y).chunks_exact(3)) {
            dst.copy_from_slice(&[src[2], src[1], src[0]]);
        }
        writer.write_all(&row_buffer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bmp_roundtrip_odd_width() {
        // Width 5 forces 1 byte of row padding.
        let mut pm = Pix::new(5, 3).unwrap().to_mut();
        pm.set_rgb(0, 0, 255, 0, 0).unwrap();
        pm.set_rgb(4, 2, 0, 0, 255).unwrap();
        pm.set_rgb(2, 1, 10, 20, 30).unwrap();
        let pix: Pix = pm.into();

        let mut buffer = Vec::new();
        write_bmp(&pix, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 54 + 16 * 3);

        let pix2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.informat(), ImageFormat::Bmp);
        assert_eq!(pix2.data(), pix.data());
    }

    fn palette_bmp(width: i32, height: i32, bpp: u16, palette: &[[u8; 4]], rows: &[&[u8]]) -> Vec<u8> {
        let offset = 54 + palette.len() as u32 * 4;
        let mut b = Vec::new();
        b.extend_from_slice(b"BM");
        b.extend_from_slice(&0u32.to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        b.extend_from_slice(&offset.to_le_bytes());
        b.extend_from_slice(&40u32.to_le_bytes());
        b.extend_from_slice(&width.to_le_bytes());
        b.extend_from_slice(&height.to_le_bytes());
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&bpp.to_le_bytes());
        b.extend_from_slice(&[0u8; 16]);
        b.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        for p in palette {
            b.extend_from_slice(p);
        }
        for r in rows {
            b.extend_from_slice(r);
        }
        b
    }

    #[test]
    fn test_read_8bit_palette_top_down() {
        // BGRA palette entries
        let palette = [[0, 0, 0, 0], [30, 20, 10, 0]];
        let bytes = palette_bmp(2, -2, 8, &palette, &[&[1, 0, 0, 0], &[0, 1, 0, 0]]);
        let pix = read_bmp(Cursor::new(bytes)).unwrap();
        assert_eq!(pix.get_rgb(0, 0), Some((10, 20, 30)));
        assert_eq!(pix.get_rgb(1, 0), Some((0, 0, 0)));
        assert_eq!(pix.get_rgb(1, 1), Some((10, 20, 30)));
    }

    #[test]
    fn test_read_1bit_bottom_up() {
        let palette = [[0, 0, 0, 0], [255, 255, 255, 0]];
        // Bottom-up: first stored row is y = 1.
        let bytes = palette_bmp(3, 2, 1, &palette, &[&[0b1000_0000, 0, 0, 0], &[0b0010_0000, 0, 0, 0]]);
        let pix = read_bmp(Cursor::new(bytes)).unwrap();
        assert_eq!(pix.get_rgb(0, 1), Some((255, 255, 255)));
        assert_eq!(pix.get_rgb(2, 0), Some((255, 255, 255)));
        assert_eq!(pix.get_rgb(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn test_read_bmp_rejects_bad_palette_index() {
        let palette = [[0, 0, 0, 0]];
        let bytes = palette_bmp(1, 1, 8, &palette, &[&[5, 0, 0, 0]]);
        assert!(matches!(
            read_bmp(Cursor::new(bytes)),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_read_bmp_oversized_header() {
        let bytes = palette_bmp(i32::MAX, i32::MAX, 24, &[], &[&[0, 0, 0, 0]]);
        assert!(matches!(
            read_bmp(Cursor::new(bytes)),
            Err(IoError::InvalidData(_))
        ));
    }
}
