//! lowlight - Low-light image brightening
//!
//! Brightens dark photographs with a locally adaptive gain. Each pixel is
//! multiplied by a gain looked up from a fixed-point table, indexed by an
//! edge-aware estimate of the brightness around it, so dark regions are
//! lifted while bright regions and strong edges are left mostly alone.
//!
//! # Overview
//!
//! - [`filter`] - gain table, brightness estimator and the enhancer
//! - [`io`] - PNG, JPEG, PNM and BMP decode/encode
//! - [`batch`] - directory batch driver
//!
//! # Example
//!
//! ```
//! use lowlight::Pix;
//! use lowlight::filter::LowLightEnhancer;
//!
//! let dark = Pix::new_with_rgb(16, 16, 50, 50, 50).unwrap();
//! let enhancer = LowLightEnhancer::with_strength(1.0).unwrap();
//! let bright = enhancer.enhance(&dark).unwrap();
//! assert_eq!(bright.get_rgb(8, 8), Some((151, 151, 151)));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use lowlight_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use lowlight_filter as filter;
pub use lowlight_io as io;

pub mod batch;

pub use batch::{BatchError, BatchReport, BatchRunner, Dataset, run_batch};
