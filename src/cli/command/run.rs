//! Runs preprocess, disasters and analyse in sequence.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{analyse, disasters, preprocess};
use crate::cli::RunArgs;

pub fn run(args: &RunArgs) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();

    println!("[1/3] Preprocessing station export");
    outputs.extend(preprocess(&args.preprocess()).context("Stage 1/3 (preprocess) failed")?);

    println!("[2/3] Building daily climate and disaster table");
    outputs.extend(disasters(&args.disasters()).context("Stage 2/3 (disasters) failed")?);

    println!("[3/3] Analysing correlations");
    outputs.extend(analyse(&args.analyse()).context("Stage 3/3 (analyse) failed")?);

    Ok(outputs)
}

// -- Tests -------------------------------------------------------------------
