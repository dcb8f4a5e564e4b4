//! PNM (Portable Any Map) format support
//!
//! Reads PGM (P5) and PPM (P6) binary images with maxval up to 255,
//! and writes P6. ASCII variants (P1/P2/P3), PBM and PAM are not read.
//!
//! # See also
//! [`crate::format::detect_format_from_bytes`] for the `P5`/`P6` magic.

use crate::{IoError, IoResult};
use lowlight_core::{ImageFormat, Pix};
use std::io::{BufRead, Read, Write};

/// Read one whitespace-delimited header token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        let c = byte[0];
        if c == b'#' && token.is_empty() {
            let mut comment = Vec::new();
            reader.read_until(b'\n', &mut comment)?;
            continue;
        }
        if c.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(c as char);
    }
    if token.is_empty() {
        return Err(IoError::InvalidData("truncated PNM header".to_string()));
    }
    Ok(token)
}

fn read_number<R: BufRead>(reader: &mut R, what: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse::<u32>()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM {}: {:?}", what, token)))
}

/// Read a PNM image (P5/P6) from a reader.
///
/// # Arguments
/// * `reader` - A buffered reader positioned at the `P5`/`P6` magic
///
/// # Returns
/// An RGB `Pix`; PGM gray is replicated into all three channels and
/// samples are rescaled to 255 when maxval is lower.
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Pix> {
    let magic = read_token(&mut reader)?;
    let samples = match magic.as_str() {
        "P5" => 1usize,
        "P6" => 3usize,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM type: {}",
                other
            )));
        }
    };

    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNM maxval: {}",
            maxval
        )));
    }

    let len = crate::raster_len(width, height, samples)?;
    let mut data = crate::read_raster(&mut reader, len)
        .map_err(|e| IoError::InvalidData(format!("truncated PNM raster: {}", e)))?;
    if maxval != 255 {
        for v in &mut data {
            *v = ((*v as u32).min(maxval) * 255 / maxval) as u8;
        }
    }

    let pix = if samples == 1 {
        Pix::from_gray(width, height, &data)?
    } else {
        Pix::from_raw_rgb(width, height, data)?
    };
    let mut pix_mut = pix.try_into_mut().unwrap_or_else(|p| p.to_mut());
    pix_mut.set_informat(ImageFormat::Pnm);
    Ok(pix_mut.into())
}

/// Write a `Pix` as binary P6 to a writer.
///
/// # Arguments
/// * `pix`    - The image to encode
/// * `writer` - Destination writer
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    write!(writer, "P6\n{} {}\n255\n", pix.width(), pix.height())?;
    writer.write_all(pix.data())?;
    writer.flush()?;
    Ok(())
}
