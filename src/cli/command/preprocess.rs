//! Stage 1: clean the raw station export into a UTF-8 table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{output_path, require_input, CLEAN_TABLE};
use crate::{
    cli::{create_spinner, PreprocessArgs},
    station::{self, StationMetadata},
};

const PREVIEW_LINES: usize = 10;
const PREVIEW_WIDTH: usize = 80;

pub fn preprocess(args: &PreprocessArgs) -> Result<Vec<PathBuf>> {
    let export_path = args.dir.join(&args.input);
    require_input(
        &export_path,
        "Download the station export from https://portal.inmet.gov.br/dadoshistoricos, \
         place it in the working directory and run `inmet-disasters preprocess` again",
    )?;

    let bar = create_spinner(format!("Reading station export `{}`...", export_path.display()));
    let (metadata, table) = match station::read_export(&export_path) {
        Ok(export) => export,
        Err(e) => {
            bar.abandon_with_message("Station export could not be read");
            report_preview(&export_path);
            return Err(e).with_context(|| {
                format!("Failed to read station export `{}`", export_path.display())
            });
        }
    };
    bar.finish_with_message(format!(
        "Station export read: {} rows, {} columns",
        table.rows.len(),
        table.headers.len()
    ));

    report_metadata(&metadata);
    for (i, header) in table.headers.iter().enumerate() {
        info!("Column {}: {}", i + 1, header);
    }

    let clean_path = output_path(&args.dir, CLEAN_TABLE);
    let bar = create_spinner("Writing UTF-8 table...".to_string());
    station::write_clean(&table, &clean_path)
        .with_context(|| format!("Failed to write `{}`", clean_path.display()))?;
    bar.finish_with_message("UTF-8 table written");

    Ok(vec![clean_path])
}

fn report_metadata(metadata: &StationMetadata) {
    info!(
        "Station {} ({}), {}/{}",
        metadata.name.as_deref().unwrap_or("unknown"),
        metadata.wmo_code.as_deref().unwrap_or("-"),
        metadata.state.as_deref().unwrap_or("-"),
        metadata.region.as_deref().unwrap_or("-"),
    );
    if let (Some(lat), Some(lon)) = (metadata.latitude, metadata.longitude) {
        info!(
            "Located at {:.4}, {:.4}, altitude {:?} m, founded {:?}",
            lat, lon, metadata.altitude, metadata.founded
        );
    }
}

fn report_preview(path: &Path) {
    match station::preview_lines(path, PREVIEW_LINES, PREVIEW_WIDTH) {
        Ok(lines) => {
            warn!("First {} lines of `{}`:", lines.len(), path.display());
            for (i, line) in lines.iter().enumerate() {
                warn!("  {:>2}: {}", i + 1, line);
            }
        }
        Err(e) => warn!("Could not preview `{}`: {}", path.display(), e),
    }
}
