//! Synthetic images used in place of on-disk test data

use crate::{TestError, TestResult};
use lowlight_core::{FPix, Pix};

fn fixture_err(name: &str, e: lowlight_core::Error) -> TestError {
    TestError::Fixture {
        name: name.to_string(),
        message: e.to_string(),
    }
}

/// Image with every channel of every pixel set to `value`.
pub fn uniform_rgb(width: u32, height: u32, value: u8) -> TestResult<Pix> {
    Pix::new_with_rgb(width, height, value, value, value).map_err(|e| fixture_err("uniform", e))
}

/// Image whose colour is `left` for `x < step_x` and `right` otherwise.
pub fn step_rgb(
    width: u32,
    height: u32,
    step_x: u32,
    left: (u8, u8, u8),
    right: (u8, u8, u8),
) -> TestResult<Pix> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for _y in 0..height {
        for x in 0..width {
            let (r, g, b) = if x < step_x { left } else { right };
            data.extend_from_slice(&[r, g, b]);
        }
    }
    Pix::from_raw_rgb(width, height, data).map_err(|e| fixture_err("step", e))
}

/// Image with a horizontal dark-to-bright ramp on the red channel and
/// fixed green/blue, so the max-channel proxy varies per column.
pub fn gradient_rgb(width: u32, height: u32) -> TestResult<Pix> {
    let denom = width.saturating_sub(1).max(1);
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for _y in 0..height {
        for x in 0..width {
            let r = (x * 255 / denom).min(255) as u8;
            data.extend_from_slice(&[r, r / 2, 8]);
        }
    }
    Pix::from_raw_rgb(width, height, data).map_err(|e| fixture_err("gradient", e))
}

/// Scalar field built from a per-coordinate function.
pub fn field_from_fn(
    width: u32,
    height: u32,
    f: impl Fn(u32, u32) -> f32,
) -> TestResult<FPix> {
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(f(x, y));
        }
    }
    FPix::from_data(width, height, data).map_err(|e| fixture_err("field", e))
}
