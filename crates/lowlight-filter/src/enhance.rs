//! Single-image low-light enhancement
//!
//! The pipeline is a pure composition:
//!
//! ```text
//! Pix ─> brightness proxy ─> smoothed brightness ─> gain map ─> enhanced Pix
//! ```
//!
//! The only state that survives a call is the read-only [`GainLut`], held
//! behind an `Arc` so a batch can share one table across worker threads.

use crate::brightness::{EstimatorConfig, LocalBrightnessEstimator, brightness_proxy};
use crate::gain_lut::{GainLut, GainLutParams};
use crate::gain_map::{apply_gain_map, gain_map};
use crate::{FilterError, FilterResult};
use lowlight_core::{FPix, Pix, SAMPLES_PER_PIXEL};
use std::sync::Arc;
use std::time::Instant;

/// Enhanced image together with the intermediates that produced it
#[derive(Debug, Clone)]
pub struct EnhanceOutput {
    /// Enhanced image, same size as the input
    pub image: Pix,
    /// Normalized smoothed brightness
    pub smoothed: FPix,
    /// Real-valued per-pixel gain
    pub gains: FPix,
}

/// Reusable enhancer bundling a gain table and an estimator
#[derive(Debug, Clone)]
pub struct LowLightEnhancer {
    lut: Arc<GainLut>,
    estimator: LocalBrightnessEstimator,
}

impl LowLightEnhancer {
    /// Create an enhancer from a shared table and estimator configuration.
    pub fn new(lut: Arc<GainLut>, config: EstimatorConfig) -> FilterResult<Self> {
        Ok(Self {
            lut,
            estimator: LocalBrightnessEstimator::new(config)?,
        })
    }

    /// Default table domain and estimator with the given strength.
    pub fn with_strength(strength: f64) -> FilterResult<Self> {
        let lut = GainLut::build(&GainLutParams::with_strength(strength))?;
        Self::new(Arc::new(lut), EstimatorConfig::default())
    }

    /// The shared gain table.
    pub fn lut(&self) -> &Arc<GainLut> {
        &self.lut
    }

    /// The brightness estimator.
    pub fn estimator(&self) -> &LocalBrightnessEstimator {
        &self.estimator
    }

    /// Enhance one image.
    pub fn enhance(&self, pix: &Pix) -> FilterResult<Pix> {
        Ok(self.enhance_with_maps(pix)?.image)
    }

    /// Enhance one image and keep the smoothed brightness and gain fields.
    pub fn enhance_with_maps(&self, pix: &Pix) -> FilterResult<EnhanceOutput> {
        let start = Instant::now();

        let proxy = brightness_proxy(pix)?;
        let smoothed = self.estimator.estimate(&proxy);
        let gains = gain_map(&smoothed, &self.lut);
        let image = apply_gain_map(pix, &gains)?;

        tracing::debug!(
            width = pix.width(),
            height = pix.height(),
            mean_brightness = smoothed.mean(),
            mean_gain = gains.mean(),
            min_gain = ?gains.min_value(),
            max_gain = ?gains.max_value(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "enhanced image"
        );

        Ok(EnhanceOutput {
            image,
            smoothed,
            gains,
        })
    }

    /// Enhance an interleaved `width * height * 3` RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidInput`] if the buffer is empty, a
    /// dimension is zero, or the length does not match the dimensions.
    /// Nothing is written in that case.
    pub fn enhance_raw(&self, width: u32, height: u32, data: &[u8]) -> FilterResult<Vec<u8>> {
        let pix = pix_from_raw(width, height, data)?;
        let out = self.enhance(&pix)?;
        Ok(out.data().to_vec())
    }
}

/// Enhance one image with an explicit table and estimator configuration.
pub fn enhance_low_light(pix: &Pix, lut: &GainLut, config: &EstimatorConfig) -> FilterResult<Pix> {
    let estimator = LocalBrightnessEstimator::new(config.clone())?;
    let smoothed = estimator.estimate(&brightness_proxy(pix)?);
    let gains = gain_map(&smoothed, lut);
    apply_gain_map(pix, &gains)
}

fn pix_from_raw(width: u32, height: u32, data: &[u8]) -> FilterResult<Pix> {
    if data.is_empty() {
        return Err(FilterError::InvalidInput("pixel buffer is empty".to_string()));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(SAMPLES_PER_PIXEL));
    if width == 0 || height == 0 || expected != Some(data.len()) {
        return Err(FilterError::InvalidInput(format!(
            "buffer of {} bytes does not describe a {}x{}x{} raster",
            data.len(),
            width,
            height,
            SAMPLES_PER_PIXEL
        )));
    }
    Pix::from_raw_rgb(width, height, data.to_vec())
        .map_err(|e| FilterError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_raw_rejects_bad_buffers() {
        let enhancer = LowLightEnhancer::with_strength(1.0).unwrap();
        for (w, h, len) in [(2, 2, 0), (2, 2, 11), (2, 2, 13), (0, 2, 6)] {
            let data = vec![50u8; len];
            assert!(
                matches!(
                    enhancer.enhance_raw(w, h, &data),
                    Err(FilterError::InvalidInput(_))
                ),
                "{w}x{h} with {len} bytes should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let enhancer = LowLightEnhancer::with_strength(0.0).unwrap();
        let data: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
        let out = enhancer.enhance_raw(4, 3, &data).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_uniform_dark_image() {
        let enhancer = LowLightEnhancer::with_strength(1.0).unwrap();
        let pix = Pix::new_with_rgb(8, 8, 50, 50, 50).unwrap();
        let out = enhancer.enhance_with_maps(&pix).unwrap();
        assert!(out.smoothed.data().iter().all(|&v| v == 400.0));
        assert!(out.gains.data().iter().all(|&g| g == 3105.0 / 1024.0));
        assert_eq!(out.image.get_rgb(3, 3), Some((151, 151, 151)));
    }

    #[test]
    fn test_free_function_matches_enhancer() {
        let lut = GainLut::build(&GainLutParams::with_strength(0.7)).unwrap();
        let config = EstimatorConfig::default();
        let enhancer = LowLightEnhancer::new(Arc::new(lut.clone()), config.clone()).unwrap();
        let data: Vec<u8> = (0..6 * 5 * 3).map(|i| (i * 13 % 251) as u8).collect();
        let pix = Pix::from_raw_rgb(6, 5, data).unwrap();
        let a = enhancer.enhance(&pix).unwrap();
        let b = enhance_low_light(&pix, &lut, &config).unwrap();
        assert_eq!(a.data(), b.data());
    }
}
