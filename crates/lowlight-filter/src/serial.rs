//! Text serialization for GainLut
//!
//! # Format
//!
//! ```text
//! 1111111101110111\n      LUT[m_min]
//! 1011010010011111\n      LUT[m_min + 1]
//! ...
//! 0000010000000000\n      LUT[m_max]
//! ```
//!
//! One line per entry in ascending domain order, each exactly 16 binary
//! digits, most significant bit first. Blank lines are ignored and a
//! trailing `\r` is tolerated. Anything else rejects the whole file; no
//! partial table is ever returned.
//!
//! The file carries no header, so the domain and fractional bits come from
//! the [`GainLutParams`] the caller loads it with.

use crate::gain_lut::{GainLut, GainLutParams};
use crate::{FilterError, FilterResult};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Digits per encoded entry.
pub const ENTRY_WIDTH: usize = 16;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: usize = 100_000_000;

/// Encode one entry as 16 binary digits.
pub fn encode_entry(value: u16) -> String {
    format!("{value:016b}")
}

/// Decode one line (without its terminator) into an entry.
///
/// `line_no` is the 1-based line number reported in errors.
pub fn decode_line(line: &str, line_no: usize) -> FilterResult<u16> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.len() != ENTRY_WIDTH {
        return Err(FilterError::Format {
            line: line_no,
            reason: format!("expected {ENTRY_WIDTH} digits, got {}", line.len()),
        });
    }
    line.bytes().try_fold(0u16, |acc, b| match b {
        b'0' => Ok(acc << 1),
        b'1' => Ok((acc << 1) | 1),
        other => Err(FilterError::Format {
            line: line_no,
            reason: format!("unexpected character {:?}", other as char),
        }),
    })
}

/// Encode entries, one newline-terminated line each.
pub fn encode_entries(entries: &[u16]) -> String {
    let mut out = String::with_capacity(entries.len() * (ENTRY_WIDTH + 1));
    for &e in entries {
        out.push_str(&encode_entry(e));
        out.push('\n');
    }
    out
}

/// Decode every non-blank line of `text`.
pub fn decode_entries(text: &str) -> FilterResult<Vec<u16>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| decode_line(line, i + 1))
        .collect()
}

impl GainLut {
    /// Encode the table as text.
    pub fn to_text(&self) -> String {
        encode_entries(self.entries())
    }

    /// Write the table to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> FilterResult<()> {
        for &e in self.entries() {
            writeln!(writer, "{}", encode_entry(e))?;
        }
        Ok(())
    }

    /// Write the table to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> FilterResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Decode a table whose domain and precision are given by `params`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Format`] on any malformed line or if the
    /// number of entries differs from the domain length.
    pub fn read_from_str(text: &str, params: &GainLutParams) -> FilterResult<Self> {
        params.validate()?;
        let entries = decode_entries(text)?;
        let expected = params.domain_len();
        if entries.len() != expected {
            return Err(FilterError::Format {
                line: text.lines().count(),
                reason: format!("expected {expected} entries, found {}", entries.len()),
            });
        }
        GainLut::from_entries(params.m_min, params.frac_bits, entries)
    }

    /// Decode a table from a reader.
    pub fn read_from_reader(reader: &mut impl Read, params: &GainLutParams) -> FilterResult<Self> {
        let buf = read_limited(reader)?;
        let text = std::str::from_utf8(&buf).map_err(|e| FilterError::Format {
            line: 0,
            reason: format!("invalid UTF-8: {e}"),
        })?;
        Self::read_from_str(text, params)
    }

    /// Decode a table from a file.
    pub fn read_from_file(path: impl AsRef<Path>, params: &GainLutParams) -> FilterResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file), params)
    }
}

/// Read from a reader with a size limit.
fn read_limited(reader: &mut impl Read) -> FilterResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take((MAX_INPUT_SIZE + 1) as u64)
        .read_to_end(&mut buf)?;
    if buf.len() > MAX_INPUT_SIZE {
        return Err(FilterError::Format {
            line: 0,
            reason: format!("input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"),
        });
    }
    Ok(buf)
}
