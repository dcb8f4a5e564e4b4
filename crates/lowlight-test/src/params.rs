//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use lowlight_core::{ImageFormat, Pix};
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare values and images (default)
    #[default]
    Compare,
    /// Compare, and also write intermediate images for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "gain_lut")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn record_failure(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `|expected - actual| <= delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.record_failure(msg);
            false
        } else {
            true
        }
    }

    /// Record a boolean condition as a comparison against `true`.
    pub fn compare_bool(&mut self, expected: bool, actual: bool) -> bool {
        self.compare_values(
            if expected { 1.0 } else { 0.0 },
            if actual { 1.0 } else { 0.0 },
            0.0,
        )
    }

    /// Compare two images for exact equality
    pub fn compare_pix(&mut self, pix1: &Pix, pix2: &Pix) -> bool {
        self.index += 1;

        if !pix1.sizes_equal(pix2) {
            let msg = format!(
                "Failure in {}_reg: pix comparison for index {} - dimension mismatch",
                self.test_name, self.index
            );
            self.record_failure(msg);
            return false;
        }

        for y in 0..pix1.height() {
            for x in 0..pix1.width() {
                if pix1.get_rgb(x, y) != pix2.get_rgb(x, y) {
                    let msg = format!(
                        "Failure in {}_reg: pix comparison for index {} - pixel mismatch at ({}, {})",
                        self.test_name, self.index, x, y
                    );
                    self.record_failure(msg);
                    return false;
                }
            }
        }

        true
    }

    /// Compare two binary data arrays
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.record_failure(msg);
            false
        } else {
            true
        }
    }

    /// In display mode, write `pix` to the regout directory.
    ///
    /// Does nothing in compare mode.
    pub fn write_pix_if_display(&mut self, pix: &Pix, format: ImageFormat) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }

        let dir = regout_dir();
        fs::create_dir_all(&dir)?;
        let local_path = format!(
            "{}/{}.{:02}.{}",
            dir,
            self.test_name,
            self.index,
            format.extension()
        );

        lowlight_io::write_image(pix, &local_path, format).map_err(|e| {
            TestError::ImageWrite {
                path: local_path.clone(),
                message: e.to_string(),
            }
        })?;
        eprintln!("Wrote: {}", local_path);
        Ok(())
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all comparisons passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
