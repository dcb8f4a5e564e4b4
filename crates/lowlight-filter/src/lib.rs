//! lowlight-filter - Low-light brightening pipeline
//!
//! This crate provides the numeric core:
//!
//! - Fixed-point gain lookup table and its 16-digit text codec
//! - Edge-aware separable local brightness estimation
//! - Gain map lookup and per-channel gain application
//! - [`LowLightEnhancer`], composing the above for one image

pub mod brightness;
pub mod enhance;
mod error;
pub mod gain_lut;
pub mod gain_map;
pub mod kernel;
pub mod serial;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

// Re-export commonly used items
pub use brightness::{
    EstimatorConfig, LocalBrightnessEstimator, brightness_proxy, reflect_101,
};
pub use enhance::{EnhanceOutput, LowLightEnhancer, enhance_low_light};
pub use gain_lut::{GainLut, GainLutParams, MAX_DOMAIN_LEN, gain_entry};
pub use gain_map::{apply_gain, apply_gain_map, gain_map};
pub use serial::{decode_entries, decode_line, encode_entries, encode_entry};
