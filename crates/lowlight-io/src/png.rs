//! PNG image format support
//!
//! Every PNG variant is normalized to 8-bit RGB on read: palettes and
//! low bit depths are expanded, 16-bit samples are stripped, gray is
//! replicated across the three channels and alpha is dropped.

use crate::{IoError, IoResult};
use lowlight_core::{ImageFormat, Pix};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let width = output_info.width;
    let height = output_info.height;
    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    let samples = match output_info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG output format: {:?} {:?}",
                other, output_info.bit_depth
            )));
        }
    };

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height as usize {
        let row = &data[y * bytes_per_row..y * bytes_per_row + width as usize * samples];
        for px in row.chunks_exact(samples) {
            match samples {
                1 | 2 => rgb.extend_from_slice(&[px[0], px[0], px[0]]),
                _ => rgb.extend_from_slice(&px[..3]),
            }
        }
    }

    let pix = Pix::from_raw_rgb(width, height, rgb)?;
    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(ImageFormat::Png);
    Ok(pix_mut.into())
}

/// Write a PNG image as 8-bit RGB
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let mut encoder = Encoder::new(writer, pix.width(), pix.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    writer
        .write_image_data(pix.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_rgb() {
        let mut pix_mut = Pix::new(5, 5).unwrap().to_mut();
        pix_mut.set_rgb(0, 0, 255, 0, 0).unwrap();
        pix_mut.set_rgb(1, 1, 0, 255, 0).unwrap();
        pix_mut.set_rgb(2, 2, 0, 0, 255).unwrap();
        let pix: Pix = pix_mut.into();

        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();

        let pix2 = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.informat(), ImageFormat::Png);
        assert_eq!(pix2.data(), pix.data());
    }

    #[test]
    fn test_png_gray_expands_to_rgb() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 3, 1);
            encoder.set_color(ColorType::Grayscale);
            encoder.set_depth(BitDepth::Eight);
            let mut w = encoder.write_header().unwrap();
            w.write_image_data(&[0, 128, 255]).unwrap();
        }

        let pix = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix.get_rgb(1, 0), Some((128, 128, 128)));
        assert_eq!(pix.get_rgb(2, 0), Some((255, 255, 255)));
    }
}
