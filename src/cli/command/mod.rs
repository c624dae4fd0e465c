pub mod analyse;
pub mod disasters;
pub mod preprocess;
pub mod run;

use std::path::{Path, PathBuf};

pub use analyse::analyse;
pub use disasters::disasters;
pub use preprocess::preprocess;
pub use run::run;

use crate::error::{PipelineError, Result};

pub const DEFAULT_EXPORT: &str = "INMET_NE_SE_A409_ARACAJU_01-01-2023_A_31-12-2023.CSV";
pub const CLEAN_TABLE: &str = "INMET_ARACAJU_2023_CLEAN.CSV";
pub const MERGED_TABLE: &str = "merged_climatic_disaster_data.csv";
pub const MERGED_PARQUET: &str = "merged_climatic_disaster_data.parquet";
pub const CORRELATION_MATRIX: &str = "correlation_matrix.csv";
pub const HEATMAP_CHART: &str = "correlation_heatmap.svg";
pub const PRECIPITATION_CHART: &str = "precipitation_flooding_timeseries.svg";
pub const TEMPERATURE_CHART: &str = "temperature_landslide_timeseries.svg";

/// Fails with a remediation hint when a stage's input does not exist.
pub fn require_input(path: &Path, hint: &str) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }

    Err(PipelineError::MissingInput {
        path: path.to_path_buf(),
        hint: hint.to_string(),
    })
}

pub fn output_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}

// -- Tests -------------------------------------------------------------------
