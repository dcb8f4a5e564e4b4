//! lowlight-test - Regression test framework for lowlight
//!
//! A small port of the regutils-style harness used across the workspace
//! tests. Each test creates a [`RegParams`], records comparisons, and
//! asserts on [`RegParams::cleanup`] at the end:
//!
//! ```ignore
//! use lowlight_test::RegParams;
//!
//! let mut rp = RegParams::new("gain_lut");
//! rp.compare_values(1024.0, lut.entry(2040) as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: `compare` (default) or `display`. Display mode also
//!   writes intermediate images to `tests/regout` for visual inspection.

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // lowlight-test is at crates/lowlight-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
