//! 1D integer smoothing kernel
//!
//! The brightness estimator convolves with the same odd-length integer
//! kernel in both directions. Weights are kept as integers so the
//! unnormalized pass outputs stay exact.

use crate::{FilterError, FilterResult};

/// Default 7-tap weights, summing to 32.
pub const DEFAULT_WEIGHTS: [i32; 7] = [1, 3, 7, 10, 7, 3, 1];

/// An odd-length, non-negative 1D kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    weights: Vec<i32>,
}

impl Kernel {
    /// Create a kernel from integer weights.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] if the length is even or zero,
    /// any weight is negative, or the weights sum to zero.
    pub fn new(weights: &[i32]) -> FilterResult<Self> {
        if weights.is_empty() || weights.len() % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel length must be odd, got {}",
                weights.len()
            )));
        }
        if weights.iter().any(|&w| w < 0) {
            return Err(FilterError::InvalidKernel(
                "kernel weights must be non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<i32>() == 0 {
            return Err(FilterError::InvalidKernel(
                "kernel weights sum to zero".to_string(),
            ));
        }
        Ok(Kernel {
            weights: weights.to_vec(),
        })
    }

    /// The fixed `[1, 3, 7, 10, 7, 3, 1]` kernel.
    pub fn lowlight() -> Self {
        Kernel {
            weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }

    /// Number of taps.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false; a kernel has at least one tap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Taps on each side of the centre.
    #[inline]
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// The integer weights.
    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    /// The weights as `f32`, in tap order.
    pub fn weights_f32(&self) -> Vec<f32> {
        self.weights.iter().map(|&w| w as f32).collect()
    }

    /// Sum of all weights (32 for the default kernel).
    pub fn sum(&self) -> i32 {
        self.weights.iter().sum()
    }

    /// Whether the weights read the same in both directions.
    pub fn is_symmetric(&self) -> bool {
        self.weights.iter().eq(self.weights.iter().rev())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::lowlight()
    }
}
