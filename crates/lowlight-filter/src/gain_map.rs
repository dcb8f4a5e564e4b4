//! Gain map construction and application

use crate::gain_lut::GainLut;
use crate::{FilterError, FilterResult};
use lowlight_core::{FPix, Pix, SAMPLES_PER_PIXEL};
use rayon::prelude::*;

/// Per-pixel real-valued gain looked up from a smoothed brightness field.
///
/// # Arguments
/// * `smoothed` - Output of the brightness estimator
/// * `lut`      - Table indexed by the truncated, clamped brightness level
///
/// # Returns
/// A field of the same size holding `entry / 2^frac_bits` per pixel.
///
/// # See also
/// [`GainLut::gain_for`], [`apply_gain_map`]
pub fn gain_map(smoothed: &FPix, lut: &GainLut) -> FPix {
    let mut gains = smoothed.create_template();
    gains
        .data_mut()
        .par_iter_mut()
        .zip(smoothed.data().par_iter())
        .for_each(|(g, &m)| *g = lut.gain_for(m));
    gains
}

/// Scale one channel value, clipping into `[0, 255]`.
#[inline]
pub fn apply_gain(value: u8, gain: f32) -> u8 {
    (value as f32 * gain).clamp(0.0, 255.0) as u8
}

/// Multiply every channel of `pix` by the matching gain.
///
/// # Errors
///
/// Returns [`FilterError::InvalidInput`] if the gain field and image
/// differ in size.
pub fn apply_gain_map(pix: &Pix, gains: &FPix) -> FilterResult<Pix> {
    if pix.dimensions() != gains.dimensions() {
        return Err(FilterError::InvalidInput(format!(
            "gain map is {:?} but image is {:?}",
            gains.dimensions(),
            pix.dimensions()
        )));
    }

    let mut out = pix.to_mut();
    out.data_mut()
        .par_chunks_mut(SAMPLES_PER_PIXEL)
        .zip(gains.data().par_iter())
        .for_each(|(px, &g)| {
            for c in px.iter_mut() {
                *c = apply_gain(*c, g);
            }
        });
    Ok(out.into())
}
