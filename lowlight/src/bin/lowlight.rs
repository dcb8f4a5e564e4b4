use clap::{Args, Parser, Subcommand};
use lowlight::batch::{DEFAULT_LUT_FILE_NAME, Dataset, parse_lut_file_name};
use lowlight::filter::{EstimatorConfig, GainLut, GainLutParams, Kernel, LowLightEnhancer};
use lowlight::io::{read_image, write_image};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lowlight")]
#[command(about = "Brighten low-light images with a locally adaptive gain", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a gain LUT file
    BuildLut {
        /// Output LUT file
        output: PathBuf,

        #[command(flatten)]
        lut: LutArgs,
    },

    /// Enhance a single image
    Enhance {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path; the format follows the extension")]
        output: PathBuf,

        #[command(flatten)]
        lut: LutArgs,

        #[command(flatten)]
        estimator: EstimatorArgs,
    },

    /// Enhance every matching image of one or more directories
    Batch {
        /// Dataset as INPUT_DIR:OUTPUT_DIR:EXTENSION (repeatable)
        #[arg(long = "dataset", required = true, value_parser = parse_dataset)]
        datasets: Vec<Dataset>,

        /// Name of the LUT file written into each output directory
        #[arg(long, default_value = DEFAULT_LUT_FILE_NAME, value_parser = parse_lut_file_name)]
        lut_file_name: String,

        /// Do not write the LUT file next to the outputs
        #[arg(long, default_value_t = false)]
        no_lut_file: bool,

        /// Worker threads (defaults to the number of cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        lut: LutArgs,

        #[command(flatten)]
        estimator: EstimatorArgs,
    },
}

#[derive(Args, Debug)]
struct LutArgs {
    /// Enhancement strength in [0, 1]
    #[arg(short, long, default_value_t = 1.0)]
    strength: f64,

    /// Load this LUT file instead of building one (falls back to building)
    #[arg(long)]
    lut_file: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    m_min: u32,

    #[arg(long, default_value_t = 2040)]
    m_max: u32,

    #[arg(long, default_value_t = 10)]
    frac_bits: u32,
}

impl LutArgs {
    fn params(&self) -> GainLutParams {
        GainLutParams {
            m_min: self.m_min,
            m_max: self.m_max,
            frac_bits: self.frac_bits,
            strength: self.strength,
        }
    }

    fn load(&self) -> Result<GainLut, Box<dyn std::error::Error>> {
        let params = self.params();
        let lut = match &self.lut_file {
            Some(path) => GainLut::load_or_build(path, &params)?,
            None => GainLut::build(&params)?,
        };
        Ok(lut)
    }
}

#[derive(Args, Debug)]
struct EstimatorArgs {
    #[arg(long, default_value_t = 32.0)]
    threshold_y: f32,

    #[arg(long, default_value_t = 1024.0)]
    threshold_x: f32,

    /// Divisor applied after both blur passes
    #[arg(long, default_value_t = 128.0)]
    norm_divisor: f32,

    /// Comma-separated odd-length kernel weights
    #[arg(long, value_delimiter = ',', default_value = "1,3,7,10,7,3,1")]
    kernel: Vec<i32>,
}

impl EstimatorArgs {
    fn config(&self) -> Result<EstimatorConfig, Box<dyn std::error::Error>> {
        Ok(EstimatorConfig {
            kernel: Kernel::new(&self.kernel)?,
            threshold_y: self.threshold_y,
            threshold_x: self.threshold_x,
            norm_divisor: self.norm_divisor,
        })
    }
}

fn parse_dataset(s: &str) -> Result<Dataset, String> {
    let parts: Vec<&str> = s.rsplitn(3, ':').collect();
    match parts.as_slice() {
        [ext, output, input] if !ext.is_empty() && !output.is_empty() && !input.is_empty() => {
            Ok(Dataset::new(*input, *output, *ext))
        }
        _ => Err(format!(
            "expected INPUT_DIR:OUTPUT_DIR:EXTENSION, got {s:?}"
        )),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::BuildLut { output, lut } => {
            let table = GainLut::build(&lut.params())?;
            table.write_to_file(&output)?;
            tracing::info!(path = %output.display(), entries = table.len(), "wrote gain LUT");
        }
        Command::Enhance {
            input,
            output,
            lut,
            estimator,
        } => {
            let enhancer = LowLightEnhancer::new(Arc::new(lut.load()?), estimator.config()?)?;
            let pix = read_image(&input)?;
            let out = enhancer.enhance(&pix)?;
            let format = lowlight::batch::output_format(&output, pix.informat());
            write_image(&out, &output, format)?;
            tracing::info!(input = %input.display(), output = %output.display(), "enhanced image");
        }
        Command::Batch {
            datasets,
            lut_file_name,
            no_lut_file,
            jobs,
            lut,
            estimator,
        } => {
            if let Some(n) = jobs {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build_global()?;
            }
            let table = Arc::new(lut.load()?);
            let runner = lowlight::BatchRunner::new(table, estimator.config()?)?
                .with_lut_file_name((!no_lut_file).then_some(lut_file_name));
            let reports = runner.run(&datasets)?;
            let skipped: usize = reports.iter().map(|r| r.skipped.len()).sum();
            let written: usize = reports.iter().map(|r| r.processed()).sum();
            tracing::info!(datasets = reports.len(), written, skipped, "batch complete");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "lowlight failed");
            ExitCode::FAILURE
        }
    }
}
