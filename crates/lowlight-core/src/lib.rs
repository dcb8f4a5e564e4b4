//! lowlight-core - Basic data structures for low-light brightening
//!
//! This crate provides the data structures shared by the rest of the
//! workspace:
//!
//! - [`Pix`] / [`PixMut`] - The 8-bit RGB image container (immutable / mutable)
//! - [`FPix`] - Floating-point scalar field for brightness and gain maps
//! - [`ImageFormat`] - On-disk container tag carried through decode/encode

pub mod error;
pub mod fpix;
pub mod pix;

pub use error::{Error, Result};
pub use fpix::FPix;
pub use pix::{ImageFormat, Pix, PixMut, SAMPLES_PER_PIXEL};
