//! Edge-aware local brightness estimation
//!
//! The estimator turns the per-pixel brightness proxy `max(R, G, B)` into a
//! field that follows the local average brightness without bleeding across
//! strong edges. It is a separable 7-tap blur with one twist: any tap whose
//! value differs from the centre sample by more than the pass threshold is
//! replaced by the centre value before weighting.
//!
//! ```text
//! Gi ──vertical pass (threshold_y)──> V ──horizontal pass (threshold_x)──> H
//! smoothed = H / norm_divisor
//! ```
//!
//! Both passes are unnormalized and use reflect-101 padding (`dcb|abcd|cba`).
//! Within a pass every output sample depends only on its 7-sample window, so
//! rows are processed in parallel with rayon. The horizontal pass starts
//! only after the vertical field is complete.

use crate::kernel::Kernel;
use crate::{FilterError, FilterResult};
use lowlight_core::{FPix, Pix};
use rayon::prelude::*;

/// Default tap-substitution threshold for the vertical pass.
pub const DEFAULT_THRESHOLD_Y: f32 = 32.0;

/// Default tap-substitution threshold for the horizontal pass.
pub const DEFAULT_THRESHOLD_X: f32 = 1024.0;

/// Default divisor applied after both passes.
///
/// The unclamped energy of two passes with the default kernel is
/// `32 * 32 = 1024`; 128 keeps the historical scale of the tool.
pub const DEFAULT_NORM_DIVISOR: f32 = 128.0;

/// Mirror index `i` into `[0, n)` without repeating the edge sample.
///
/// `n` must be non-zero. Works for offsets larger than `n`.
#[inline]
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut j = i.rem_euclid(period);
    if j >= n as isize {
        j = period - j;
    }
    j as usize
}

/// Per-pixel brightness proxy: the largest of the three channels.
pub fn brightness_proxy(pix: &Pix) -> FilterResult<FPix> {
    let data: Vec<f32> = pix
        .data()
        .chunks_exact(3)
        .map(|px| px[0].max(px[1]).max(px[2]) as f32)
        .collect();
    Ok(FPix::from_data(pix.width(), pix.height(), data)?)
}

/// Immutable configuration of a [`LocalBrightnessEstimator`]
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Smoothing kernel used by both passes
    pub kernel: Kernel,
    /// Substitution threshold of the vertical pass
    pub threshold_y: f32,
    /// Substitution threshold of the horizontal pass
    pub threshold_x: f32,
    /// Divisor applied to the horizontal-pass output
    pub norm_divisor: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::lowlight(),
            threshold_y: DEFAULT_THRESHOLD_Y,
            threshold_x: DEFAULT_THRESHOLD_X,
            norm_divisor: DEFAULT_NORM_DIVISOR,
        }
    }
}

impl EstimatorConfig {
    /// Default configuration normalized by the full two-pass kernel energy
    /// instead of the historical 128.
    pub fn kernel_energy_normalized() -> Self {
        let config = Self::default();
        let sum = config.kernel.sum() as f32;
        Self {
            norm_divisor: sum * sum,
            ..config
        }
    }

    /// Check thresholds and divisor.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameters`] if a threshold is negative
    /// or not finite, or if the divisor is not a positive finite number.
    pub fn validate(&self) -> FilterResult<()> {
        for (name, value) in [
            ("threshold_y", self.threshold_y),
            ("threshold_x", self.threshold_x),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FilterError::InvalidParameters(format!(
                    "{name} must be a non-negative finite value, got {value}"
                )));
            }
        }
        if !self.norm_divisor.is_finite() || self.norm_divisor <= 0.0 {
            return Err(FilterError::InvalidParameters(format!(
                "norm_divisor must be positive, got {}",
                self.norm_divisor
            )));
        }
        Ok(())
    }
}

/// Separable edge-aware smoother
#[derive(Debug, Clone)]
pub struct LocalBrightnessEstimator {
    config: EstimatorConfig,
    weights: Vec<f32>,
}

impl Default for LocalBrightnessEstimator {
    fn default() -> Self {
        let config = EstimatorConfig::default();
        let weights = config.kernel.weights_f32();
        Self { config, weights }
    }
}

impl LocalBrightnessEstimator {
    /// Create an estimator from a validated configuration.
    pub fn new(config: EstimatorConfig) -> FilterResult<Self> {
        config.validate()?;
        let weights = config.kernel.weights_f32();
        Ok(Self { config, weights })
    }

    /// The configuration this estimator was built with.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Weighted sum over the kernel taps with centre substitution.
    #[inline]
    fn clamped_sum(&self, center: f32, threshold: f32, tap: impl Fn(isize) -> f32) -> f32 {
        let radius = self.config.kernel.radius() as isize;
        self.weights
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let v = tap(k as isize - radius);
                let v = if (v - center).abs() > threshold { center } else { v };
                w * v
            })
            .sum()
    }

    /// Unnormalized vertical pass.
    pub fn vertical_pass(&self, field: &FPix) -> FPix {
        let (w, h) = (field.width() as usize, field.height() as usize);
        let threshold = self.config.threshold_y;
        let src = field.data();
        let mut out = field.create_template();

        out.data_mut()
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, dst) in row.iter_mut().enumerate() {
                    let center = src[y * w + x];
                    *dst = self.clamped_sum(center, threshold, |dy| {
                        src[reflect_101(y as isize + dy, h) * w + x]
                    });
                }
            });
        out
    }

    /// Unnormalized horizontal pass.
    pub fn horizontal_pass(&self, field: &FPix) -> FPix {
        let w = field.width() as usize;
        let threshold = self.config.threshold_x;
        let src = field.data();
        let mut out = field.create_template();

        out.data_mut()
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                let line = &src[y * w..(y + 1) * w];
                for (x, dst) in row.iter_mut().enumerate() {
                    let center = line[x];
                    *dst = self.clamped_sum(center, threshold, |dx| {
                        line[reflect_101(x as isize + dx, w)]
                    });
                }
            });
        out
    }

    /// Both passes without the final division.
    pub fn estimate_unnormalized(&self, field: &FPix) -> FPix {
        let vertical = self.vertical_pass(field);
        self.horizontal_pass(&vertical)
    }

    /// Divide a two-pass field by the configured divisor in place.
    pub fn normalize(&self, field: &mut FPix) {
        let d = self.config.norm_divisor;
        field.data_mut().par_iter_mut().for_each(|v| *v /= d);
    }

    /// Smoothed brightness field of a raw brightness field.
    pub fn estimate(&self, field: &FPix) -> FPix {
        let mut smoothed = self.estimate_unnormalized(field);
        self.normalize(&mut smoothed);
        smoothed
    }

    /// Smoothed brightness field of an RGB image.
    pub fn estimate_pix(&self, pix: &Pix) -> FilterResult<FPix> {
        let proxy = brightness_proxy(pix)?;
        Ok(self.estimate(&proxy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        let n = 5;
        let got: Vec<usize> = (-3..8).map(|i| reflect_101(i, n)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(reflect_101(-3, 1), 0);
        // Offsets past the opposite edge keep bouncing.
        assert_eq!(reflect_101(3, 2), 1);
        assert_eq!(reflect_101(-3, 2), 1);
        assert_eq!(reflect_101(4, 3), 0);
    }

    #[test]
    fn test_brightness_proxy_takes_max_channel() {
        let pix = Pix::from_raw_rgb(2, 1, vec![10, 200, 30, 90, 5, 91]).unwrap();
        let g = brightness_proxy(&pix).unwrap();
        assert_eq!(g.data(), &[200.0, 91.0]);
    }

    #[test]
    fn test_uniform_field_scale() {
        let est = LocalBrightnessEstimator::default();
        let field = FPix::new_with_value(9, 9, 50.0).unwrap();
        let raw = est.estimate_unnormalized(&field);
        assert!(raw.data().iter().all(|&v| v == 51200.0));
        let smoothed = est.estimate(&field);
        assert!(smoothed.data().iter().all(|&v| v == 400.0));
    }

    #[test]
    fn test_threshold_substitutes_center() {
        // A single bright row: its neighbours differ by more than 32, so
        // every tap of the bright row is replaced with its own value.
        let mut field = FPix::new_with_value(1, 7, 10.0).unwrap();
        field.set_pixel(0, 3, 100.0).unwrap();
        let est = LocalBrightnessEstimator::default();
        let v = est.vertical_pass(&field);
        assert_eq!(v.get_pixel(0, 3).unwrap(), 3200.0);
        assert_eq!(v.get_pixel(0, 0).unwrap(), 320.0);
    }

    #[test]
    fn test_threshold_boundary_keeps_tap() {
        // Row 2 sits one tap (weight 7) above row 3. A difference of exactly
        // 32 is kept; 33 is replaced by the centre value 0.
        let est = LocalBrightnessEstimator::default();
        let mut field = FPix::new(1, 7).unwrap();
        field.set_pixel(0, 2, 32.0).unwrap();
        assert_eq!(est.vertical_pass(&field).get_pixel(0, 3).unwrap(), 224.0);
        field.set_pixel(0, 2, 33.0).unwrap();
        assert_eq!(est.vertical_pass(&field).get_pixel(0, 3).unwrap(), 0.0);
    }

    #[test]
    fn test_single_pixel_image() {
        let est = LocalBrightnessEstimator::default();
        let field = FPix::new_with_value(1, 1, 7.0).unwrap();
        assert_eq!(est.estimate(&field).data(), &[7.0 * 8.0]);
    }

    #[test]
    fn test_config_validation() {
        let bad = EstimatorConfig {
            norm_divisor: 0.0,
            ..Default::default()
        };
        assert!(LocalBrightnessEstimator::new(bad).is_err());
        let bad = EstimatorConfig {
            threshold_x: f32::NAN,
            ..Default::default()
        };
        assert!(LocalBrightnessEstimator::new(bad).is_err());
        assert_eq!(EstimatorConfig::kernel_energy_normalized().norm_divisor, 1024.0);
    }
}
