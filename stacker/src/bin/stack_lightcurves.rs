//! Stack ATLAS forced-photometry light curves.
//!
//! Usage:
//!   stack-lightcurves <F_IN> <F_OUT> <REFERENCE_EPOCHS> [-s 7] [-e 45] [-c 35] [-o 50]
//!
//! `F_IN` is a single light curve or a directory of them; stacked tables
//! are written under `F_OUT` with the same file names.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use atlas_stacker::config::StackerConfig;
use atlas_stacker::io::ReferenceEpochLoader;
use atlas_stacker::{BatchRunner, StackingPipeline};

/// Command line arguments for the light curve stacker
#[derive(Parser, Debug)]
#[command(
    name = "stack-lightcurves",
    about = "Bin and robustly stack ATLAS forced-photometry light curves",
    long_about = None
)]
struct Args {
    /// Light curve file or directory of light curves
    f_in: PathBuf,

    /// Output directory (created when missing)
    f_out: PathBuf,

    /// Reference epochs for the cyan band (.npy, .json or text)
    reference_epochs: PathBuf,

    /// Orange stack width in days
    #[arg(short = 's', long = "stack")]
    stack: Option<u32>,

    /// Upper limit on individual epoch uncertainty (uJy)
    #[arg(short = 'e', long = "error")]
    error: Option<f64>,

    /// Upper limit on stacked cyan uncertainty (uJy)
    #[arg(short = 'c', long = "cyan")]
    cyan: Option<f64>,

    /// Upper limit on stacked orange uncertainty (uJy)
    #[arg(short = 'o', long = "orange")]
    orange: Option<f64>,

    /// TOML configuration file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Process files one at a time
    #[arg(long)]
    serial: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<StackerConfig> {
        let mut config = match &self.config {
            Some(path) => StackerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => StackerConfig::default(),
        };

        if let Some(stack) = self.stack {
            config.stacking.stack_width = stack;
        }
        if let Some(error) = self.error {
            config.stacking.global_error_limit = error;
        }
        if let Some(cyan) = self.cyan {
            config.stacking.cyan_error_limit = cyan;
        }
        if let Some(orange) = self.orange {
            config.stacking.orange_error_limit = orange;
        }
        if self.serial {
            config.batch.parallel = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    info!("Stacking with {:?}", config.stacking);

    let reference_epochs = ReferenceEpochLoader::load_from_file(&args.reference_epochs)?;
    let pipeline = StackingPipeline::new(config.stacking, reference_epochs)
        .context("Invalid stacking configuration")?;

    let report = BatchRunner::new(pipeline, config.batch).run(&args.f_in, &args.f_out)?;
    if !report.is_clean() {
        info!(
            "{} light curves could not be read; see the unread report in {}",
            report.unreadable.len(),
            args.f_out.display()
        );
    }
    Ok(())
}
