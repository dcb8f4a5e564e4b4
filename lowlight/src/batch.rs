//! Batch enhancement over directories of images
//!
//! A [`Dataset`] names an input directory, an output directory and the file
//! extension to pick up. Every matching image is enhanced with the same
//! shared [`GainLut`] and written under its original file name. Images of
//! one dataset run concurrently on the rayon pool. An image that cannot be
//! read, enhanced or written is logged and skipped; the rest of the dataset
//! still runs.
//!
//! The table used is written next to the outputs (`weight.dat` by default)
//! so a result directory records how it was produced.

use crate::filter::{EstimatorConfig, FilterError, GainLut, LowLightEnhancer};
use crate::io::IoError;
use lowlight_core::ImageFormat;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Default name of the LUT file written next to the outputs.
pub const DEFAULT_LUT_FILE_NAME: &str = "weight.dat";

/// Errors that abort a batch
///
/// Per-image failures do not abort; they are collected in
/// [`BatchReport::skipped`].
#[derive(Debug, Error)]
pub enum BatchError {
    /// Directory could not be listed or created
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Image decode or encode failure
    #[error("image error: {0}")]
    Image(#[from] IoError),

    /// Pipeline or LUT failure
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// LUT file name is not a plain file name
    #[error("invalid LUT file name: {0}")]
    InvalidLutFileName(String),
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

/// One input directory and where its results go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Directory scanned for source images (not recursive)
    pub input_dir: PathBuf,
    /// Directory receiving the enhanced images
    pub output_dir: PathBuf,
    /// File extension to match, without the dot (case-insensitive)
    pub extension: String,
}

impl Dataset {
    /// Create a dataset description.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Source images of this dataset, sorted by path.
    pub fn sources(&self) -> BatchResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.input_dir).map_err(|source| BatchError::Io {
            path: self.input_dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BatchError::Io {
                path: self.input_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && self.matches(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

/// Outcome of one dataset
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Written output files
    pub written: Vec<PathBuf>,
    /// Sources that were skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// LUT file written next to the outputs, if any
    pub lut_file: Option<PathBuf>,
}

impl BatchReport {
    /// Number of images written.
    pub fn processed(&self) -> usize {
        self.written.len()
    }
}

/// Batch driver sharing one enhancer across all images
#[derive(Debug, Clone)]
pub struct BatchRunner {
    enhancer: LowLightEnhancer,
    lut_file_name: Option<String>,
}

impl BatchRunner {
    /// Create a runner for a shared table and estimator configuration.
    pub fn new(lut: Arc<GainLut>, config: EstimatorConfig) -> BatchResult<Self> {
        Ok(Self {
            enhancer: LowLightEnhancer::new(lut, config)?,
            lut_file_name: Some(DEFAULT_LUT_FILE_NAME.to_string()),
        })
    }

    /// Write the table under `name` in each output directory, or not at
    /// all with `None`.
    pub fn with_lut_file_name(mut self, name: Option<String>) -> Self {
        self.lut_file_name = name;
        self
    }

    /// The shared enhancer.
    pub fn enhancer(&self) -> &LowLightEnhancer {
        &self.enhancer
    }

    /// Run every dataset in order.
    pub fn run(&self, datasets: &[Dataset]) -> BatchResult<Vec<BatchReport>> {
        datasets.iter().map(|d| self.run_dataset(d)).collect()
    }

    /// Enhance every matching image of one dataset.
    pub fn run_dataset(&self, dataset: &Dataset) -> BatchResult<BatchReport> {
        let start = Instant::now();
        if let Some(name) = &self.lut_file_name {
            parse_lut_file_name(name).map_err(BatchError::InvalidLutFileName)?;
        }
        let sources = dataset.sources()?;
        std::fs::create_dir_all(&dataset.output_dir).map_err(|source| BatchError::Io {
            path: dataset.output_dir.clone(),
            source,
        })?;

        tracing::info!(
            input = %dataset.input_dir.display(),
            output = %dataset.output_dir.display(),
            extension = %dataset.extension,
            images = sources.len(),
            "starting dataset"
        );

        let results: Vec<(PathBuf, Result<PathBuf, String>)> = sources
            .par_iter()
            .map(|src| {
                let res = self
                    .enhance_file(src, &dataset.output_dir)
                    .map_err(|e| e.to_string());
                (src.clone(), res)
            })
            .collect();

        let mut report = BatchReport::default();
        for (src, res) in results {
            match res {
                Ok(dst) => report.written.push(dst),
                Err(reason) => {
                    tracing::warn!(path = %src.display(), error = %reason, "skipping image");
                    report.skipped.push((src, reason));
                }
            }
        }

        if let Some(name) = &self.lut_file_name {
            let path = dataset.output_dir.join(name);
            self.enhancer.lut().write_to_file(&path)?;
            report.lut_file = Some(path);
        }

        tracing::info!(
            output = %dataset.output_dir.display(),
            written = report.processed(),
            skipped = report.skipped.len(),
            elapsed_s = start.elapsed().as_secs_f64(),
            "finished dataset"
        );
        Ok(report)
    }

    /// Enhance one file into `output_dir`, keeping its file name.
    pub fn enhance_file(&self, src: &Path, output_dir: &Path) -> BatchResult<PathBuf> {
        let file_name = src.file_name().ok_or_else(|| BatchError::Io {
            path: src.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;
        let dst = output_dir.join(file_name);

        let pix = crate::io::read_image(src)?;
        let out = self.enhancer.enhance(&pix)?;
        let format = output_format(&dst, pix.informat());
        crate::io::write_image(&out, &dst, format)?;

        tracing::debug!(src = %src.display(), dst = %dst.display(), "wrote image");
        Ok(dst)
    }
}

/// Accept `name` only if it is a single plain file name.
///
/// Empty names, `.`/`..` and anything containing a path separator are
/// rejected, so the table always lands inside the output directory.
pub fn parse_lut_file_name(name: &str) -> Result<String, String> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || name.chars().any(std::path::is_separator) {
        return Err(format!("expected a plain file name, got {name:?}"));
    }
    Ok(name.to_string())
}

/// Output container for `path`: its extension, else the decoded format.
pub fn output_format(path: &Path, decoded: ImageFormat) -> ImageFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(decoded)
}

/// Enhance a list of datasets with one shared table.
pub fn run_batch(
    datasets: &[Dataset],
    lut: Arc<GainLut>,
    config: EstimatorConfig,
) -> BatchResult<Vec<BatchReport>> {
    BatchRunner::new(lut, config)?.run(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_extension_normalized() {
        let d = Dataset::new("in", "out", ".JPG");
        assert_eq!(d.extension, "JPG");
        assert!(d.matches(Path::new("in/a.jpg")));
        assert!(d.matches(Path::new("in/b.JpG")));
        assert!(!d.matches(Path::new("in/c.png")));
        assert!(!d.matches(Path::new("in/noext")));
    }

    #[test]
    fn test_output_format() {
        assert_eq!(
            output_format(Path::new("x/a.png"), ImageFormat::Jpeg),
            ImageFormat::Png
        );
        assert_eq!(
            output_format(Path::new("x/a.raw"), ImageFormat::Jpeg),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_lut_file_name() {
        assert_eq!(parse_lut_file_name("weight.dat").as_deref(), Ok("weight.dat"));
        assert!(parse_lut_file_name("").is_err());
        assert!(parse_lut_file_name("..").is_err());
        assert!(parse_lut_file_name("sub/weight.dat").is_err());
        assert!(parse_lut_file_name("weight.dat/").is_err());
    }

    #[test]
    fn test_empty_lut_file_name_fails_before_images() {
        let lut = Arc::new(GainLut::build(&Default::default()).unwrap());
        let runner = BatchRunner::new(lut, EstimatorConfig::default())
            .unwrap()
            .with_lut_file_name(Some(String::new()));
        let d = Dataset::new("/nonexistent/lowlight/input", "/tmp/unused", "png");
        assert!(matches!(
            runner.run_dataset(&d),
            Err(BatchError::InvalidLutFileName(_))
        ));
    }

    #[test]
    fn test_missing_input_dir() {
        let d = Dataset::new("/nonexistent/lowlight/input", "/tmp/unused", "png");
        assert!(matches!(d.sources(), Err(BatchError::Io { .. })));
    }
}
