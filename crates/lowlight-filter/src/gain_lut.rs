//! Fixed-point gain lookup table
//!
//! Maps an integer local-brightness level `m` in `[m_min, m_max]` to an
//! unsigned Q-format gain (Q8.10 with the default 10 fractional bits).
//! For strength `t` the entry for `m` is
//!
//! ```text
//! raw   = max(0, 4080 / m - 1)
//! gain  = sqrt(raw) * t + (1 - t)
//! entry = floor(gain * 2^frac_bits)      saturated to 65535
//! ```
//!
//! Entries never increase with `m`, so brighter neighbourhoods receive
//! less amplification. At `t = 0` every entry is exactly `1 << frac_bits`.
//!
//! A `GainLut` is immutable once built; share it between threads with
//! `Arc<GainLut>`.

use crate::{FilterError, FilterResult};
use std::path::Path;

/// Numerator of the gain curve: twice the default top brightness level.
pub const GAIN_CURVE_NUMERATOR: f64 = 4080.0;

/// Default lowest brightness level.
pub const DEFAULT_M_MIN: u32 = 1;

/// Default highest brightness level.
pub const DEFAULT_M_MAX: u32 = 2040;

/// Largest number of brightness levels a table may span.
pub const MAX_DOMAIN_LEN: usize = u16::MAX as usize + 1;

/// Default number of fractional bits (Q8.10).
pub const DEFAULT_FRAC_BITS: u32 = 10;

/// Construction parameters for a [`GainLut`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainLutParams {
    /// Lowest brightness level (inclusive, >= 1)
    pub m_min: u32,
    /// Highest brightness level (inclusive)
    pub m_max: u32,
    /// Fractional bits of the fixed-point entries (<= 16)
    pub frac_bits: u32,
    /// Enhancement strength in [0, 1]; 0 is the identity
    pub strength: f64,
}

impl Default for GainLutParams {
    fn default() -> Self {
        Self {
            m_min: DEFAULT_M_MIN,
            m_max: DEFAULT_M_MAX,
            frac_bits: DEFAULT_FRAC_BITS,
            strength: 1.0,
        }
    }
}

impl GainLutParams {
    /// Default domain and precision with the given strength.
    pub fn with_strength(strength: f64) -> Self {
        Self {
            strength,
            ..Self::default()
        }
    }

    /// Number of entries in the domain.
    pub fn domain_len(&self) -> usize {
        (self.m_max - self.m_min) as usize + 1
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameters`] unless
    /// `1 <= m_min <= m_max`, the domain spans at most [`MAX_DOMAIN_LEN`]
    /// levels, `frac_bits <= 16` and `strength` is a finite value in `[0, 1]`.
    pub fn validate(&self) -> FilterResult<()> {
        if self.m_min == 0 {
            return Err(FilterError::InvalidParameters(
                "m_min must be >= 1".to_string(),
            ));
        }
        if self.m_min > self.m_max {
            return Err(FilterError::InvalidParameters(format!(
                "m_min ({}) must not exceed m_max ({})",
                self.m_min, self.m_max
            )));
        }
        if self.domain_len() > MAX_DOMAIN_LEN {
            return Err(FilterError::InvalidParameters(format!(
                "domain [{}, {}] exceeds {} levels",
                self.m_min, self.m_max, MAX_DOMAIN_LEN
            )));
        }
        if self.frac_bits > 16 {
            return Err(FilterError::InvalidParameters(format!(
                "frac_bits must be <= 16, got {}",
                self.frac_bits
            )));
        }
        if !self.strength.is_finite() || !(0.0..=1.0).contains(&self.strength) {
            return Err(FilterError::InvalidParameters(format!(
                "strength must be in [0, 1], got {}",
                self.strength
            )));
        }
        Ok(())
    }
}

/// Compute one fixed-point LUT entry.
///
/// Values that do not fit in 16 bits saturate to `u16::MAX`. This only
/// happens at the dark end of the domain with a high strength and more
/// than 10 fractional bits, or with `frac_bits == 16` for gains >= 1.
pub fn gain_entry(m: u32, frac_bits: u32, strength: f64) -> u16 {
    let raw = (GAIN_CURVE_NUMERATOR / m as f64 - 1.0).max(0.0);
    let gain = raw.sqrt() * strength + (1.0 - strength);
    let fixed = (gain * (1u64 << frac_bits) as f64).floor();
    if fixed >= u16::MAX as f64 {
        u16::MAX
    } else if fixed <= 0.0 {
        0
    } else {
        fixed as u16
    }
}

/// Fixed-point gain table over `[m_min, m_max]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainLut {
    m_min: u32,
    frac_bits: u32,
    entries: Vec<u16>,
}

impl GainLut {
    /// Build the table for the given parameters.
    ///
    /// # Errors
    ///
    /// Only parameter validation can fail; see [`GainLutParams::validate`].
    pub fn build(params: &GainLutParams) -> FilterResult<Self> {
        params.validate()?;

        let entries: Vec<u16> = (params.m_min..=params.m_max)
            .map(|m| gain_entry(m, params.frac_bits, params.strength))
            .collect();

        tracing::debug!(
            m_min = params.m_min,
            m_max = params.m_max,
            frac_bits = params.frac_bits,
            strength = params.strength,
            first = entries.first().copied(),
            last = entries.last().copied(),
            "built gain LUT"
        );

        Ok(GainLut {
            m_min: params.m_min,
            frac_bits: params.frac_bits,
            entries,
        })
    }

    /// Wrap entries that were produced elsewhere (e.g. decoded from a file).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameters`] if `entries` is empty,
    /// `m_min` is 0, `frac_bits > 16`, or the domain would overflow `u32`.
    pub fn from_entries(m_min: u32, frac_bits: u32, entries: Vec<u16>) -> FilterResult<Self> {
        if entries.is_empty() {
            return Err(FilterError::InvalidParameters(
                "gain LUT must have at least one entry".to_string(),
            ));
        }
        if m_min == 0 {
            return Err(FilterError::InvalidParameters(
                "m_min must be >= 1".to_string(),
            ));
        }
        if entries.len() > MAX_DOMAIN_LEN {
            return Err(FilterError::InvalidParameters(format!(
                "gain LUT has {} entries, at most {} allowed",
                entries.len(),
                MAX_DOMAIN_LEN
            )));
        }
        if frac_bits > 16 {
            return Err(FilterError::InvalidParameters(format!(
                "frac_bits must be <= 16, got {}",
                frac_bits
            )));
        }
        let span = u32::try_from(entries.len() - 1).ok();
        if span.and_then(|s| m_min.checked_add(s)).is_none() {
            return Err(FilterError::InvalidParameters(
                "gain LUT domain overflows u32".to_string(),
            ));
        }
        Ok(GainLut {
            m_min,
            frac_bits,
            entries,
        })
    }

    /// Read a LUT file, or build a fresh table if the file is missing or
    /// malformed.
    ///
    /// # Errors
    ///
    /// Fails only if `params` themselves are invalid.
    pub fn load_or_build(path: impl AsRef<Path>, params: &GainLutParams) -> FilterResult<Self> {
        params.validate()?;
        let path = path.as_ref();
        match Self::read_from_file(path, params) {
            Ok(lut) => {
                tracing::debug!(path = %path.display(), entries = lut.len(), "loaded gain LUT");
                Ok(lut)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    strength = params.strength,
                    "could not load gain LUT, building a fresh one"
                );
                Self::build(params)
            }
        }
    }

    /// Lowest brightness level.
    #[inline]
    pub fn m_min(&self) -> u32 {
        self.m_min
    }

    /// Highest brightness level.
    #[inline]
    pub fn m_max(&self) -> u32 {
        self.m_min + (self.entries.len() as u32 - 1)
    }

    /// Fractional bits of the fixed-point entries.
    #[inline]
    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a LUT has at least one entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending domain order.
    pub fn entries(&self) -> &[u16] {
        &self.entries
    }

    /// Fixed-point entry for brightness level `m`, if inside the domain.
    pub fn entry(&self, m: u32) -> Option<u16> {
        if m < self.m_min {
            return None;
        }
        self.entries.get((m - self.m_min) as usize).copied()
    }

    /// Map a smoothed brightness value to a LUT index.
    ///
    /// The value is clamped to at least 1.0, floored, and clamped into
    /// `[m_min, m_max]`, so the returned index is always valid. NaN maps
    /// to `m_min`.
    #[inline]
    pub fn index_for(&self, value: f32) -> u32 {
        let level = value.max(1.0).floor() as u32;
        level.clamp(self.m_min, self.m_max())
    }

    /// Real-valued gain for brightness level `m` (clamped into the domain).
    #[inline]
    pub fn gain_at(&self, m: u32) -> f32 {
        let m = m.clamp(self.m_min, self.m_max());
        let fixed = self.entries[(m - self.m_min) as usize];
        fixed as f32 / (1u32 << self.frac_bits) as f32
    }

    /// Real-valued gain for a smoothed brightness value.
    #[inline]
    pub fn gain_for(&self, value: f32) -> f32 {
        self.gain_at(self.index_for(value))
    }

    /// Whether every entry is exactly 1.0 in fixed point.
    pub fn is_identity(&self) -> bool {
        let one = 1u32 << self.frac_bits;
        self.entries.iter().all(|&e| e as u32 == one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_entries() {
        let lut = GainLut::build(&GainLutParams::default()).unwrap();
        assert_eq!(lut.len(), 2040);
        assert_eq!(lut.m_max(), 2040);
        assert_eq!(lut.entry(1), Some(65399));
        assert_eq!(lut.entry(2), Some(46239));
        assert_eq!(lut.entry(400), Some(3105));
        assert_eq!(lut.entry(2040), Some(1024));
        assert_eq!(lut.entry(0), None);
        assert_eq!(lut.entry(2041), None);
    }

    #[test]
    fn test_half_strength_blend() {
        let lut = GainLut::build(&GainLutParams::with_strength(0.5)).unwrap();
        assert_eq!(lut.entry(1), Some(33211));
        assert_eq!(lut.entry(50), Some(5108));
    }

    #[test]
    fn test_identity_at_zero_strength() {
        let lut = GainLut::build(&GainLutParams::with_strength(0.0)).unwrap();
        assert!(lut.is_identity());
        assert_eq!(lut.gain_for(37.0), 1.0);
    }

    #[test]
    fn test_raw_clamped_to_zero_past_numerator() {
        // 4080 / 4080 - 1 == 0; beyond that raw would go negative.
        assert_eq!(gain_entry(4080, 10, 1.0), 0);
        assert_eq!(gain_entry(5000, 10, 1.0), 0);
        assert_eq!(gain_entry(5000, 10, 0.5), 512);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(gain_entry(1, 11, 1.0), u16::MAX);
        assert_eq!(gain_entry(2040, 16, 0.0), u16::MAX);
        assert_eq!(gain_entry(1, 10, 1.0), 65399);
    }

    #[test]
    fn test_index_for_clamps() {
        let lut = GainLut::build(&GainLutParams::default()).unwrap();
        assert_eq!(lut.index_for(-5.0), 1);
        assert_eq!(lut.index_for(0.3), 1);
        assert_eq!(lut.index_for(f32::NAN), 1);
        assert_eq!(lut.index_for(399.99), 399);
        assert_eq!(lut.index_for(1.0e9), 2040);
        assert_eq!(lut.index_for(f32::INFINITY), 2040);
    }

    #[test]
    fn test_validate() {
        let bad = [
            GainLutParams {
                m_min: 0,
                ..Default::default()
            },
            GainLutParams {
                m_min: 10,
                m_max: 9,
                ..Default::default()
            },
            GainLutParams {
                frac_bits: 17,
                ..Default::default()
            },
            GainLutParams {
                m_max: u32::MAX,
                ..Default::default()
            },
            GainLutParams::with_strength(1.5),
            GainLutParams::with_strength(f64::NAN),
        ];
        for p in bad {
            assert!(GainLut::build(&p).is_err(), "{:?} should be rejected", p);
        }
    }

    #[test]
    fn test_from_entries() {
        let lut = GainLut::from_entries(5, 10, vec![3000, 2000, 1024]).unwrap();
        assert_eq!(lut.m_max(), 7);
        assert_eq!(lut.gain_at(100), 1.0);
        assert!(GainLut::from_entries(5, 10, Vec::new()).is_err());
        assert!(GainLut::from_entries(0, 10, vec![1]).is_err());
        assert!(GainLut::from_entries(1, 10, vec![1024; MAX_DOMAIN_LEN + 1]).is_err());
    }

    #[test]
    fn test_widest_domain() {
        let params = GainLutParams {
            m_max: MAX_DOMAIN_LEN as u32,
            ..Default::default()
        };
        let lut = GainLut::build(&params).unwrap();
        assert_eq!(lut.len(), MAX_DOMAIN_LEN);
        assert_eq!(lut.entry(MAX_DOMAIN_LEN as u32), Some(0));
    }
}
