//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;

use crate::disaster::{IndicatorSpan, LabelParams};
use command::DEFAULT_EXPORT;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw station export into a UTF-8 table
    Preprocess(PreprocessArgs),
    /// Aggregate daily climate, label synthetic disasters and merge them
    Disasters(DisasterArgs),
    /// Correlate climate with disaster indicators and draw charts
    Analyse(AnalyseArgs),
    /// Run every stage in sequence
    Run(RunArgs),
}

impl Commands {
    /// The command to run after this one succeeds, if any.
    pub fn next_step(&self) -> Option<&'static str> {
        match self {
            Commands::Preprocess(_) => Some("inmet-disasters disasters"),
            Commands::Disasters(_) => Some("inmet-disasters analyse"),
            Commands::Analyse(_) | Commands::Run(_) => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PreprocessArgs {
    /// Directory holding inputs and outputs
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Station export, relative to `--dir`
    #[arg(long, default_value = DEFAULT_EXPORT)]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct DisasterArgs {
    /// Directory holding inputs and outputs
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Seed for the landslide sample
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Label a fixed calendar year instead of the years in the data
    #[arg(long)]
    pub year: Option<i32>,
}

impl DisasterArgs {
    pub fn label_params(&self) -> LabelParams {
        LabelParams {
            seed: self.seed,
            span: self
                .year
                .map_or(IndicatorSpan::CoveredYears, IndicatorSpan::Year),
            ..LabelParams::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AnalyseArgs {
    /// Directory holding inputs and outputs
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Skip chart rendering
    #[arg(long)]
    pub no_plots: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding inputs and outputs
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Station export, relative to `--dir`
    #[arg(long, default_value = DEFAULT_EXPORT)]
    pub input: PathBuf,
    /// Seed for the landslide sample
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Label a fixed calendar year instead of the years in the data
    #[arg(long)]
    pub year: Option<i32>,
    /// Skip chart rendering
    #[arg(long)]
    pub no_plots: bool,
}

impl RunArgs {
    pub fn preprocess(&self) -> PreprocessArgs {
        PreprocessArgs {
            dir: self.dir.clone(),
            input: self.input.clone(),
        }
    }

    pub fn disasters(&self) -> DisasterArgs {
        DisasterArgs {
            dir: self.dir.clone(),
            seed: self.seed,
            year: self.year,
        }
    }

    pub fn analyse(&self) -> AnalyseArgs {
        AnalyseArgs {
            dir: self.dir.clone(),
            no_plots: self.no_plots,
        }
    }
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

// -- Tests -------------------------------------------------------------------
