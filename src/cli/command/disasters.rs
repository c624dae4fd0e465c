//! Stage 2: daily climate, synthetic disaster indicators and the merged table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{output_path, require_input, CLEAN_TABLE, MERGED_PARQUET, MERGED_TABLE};
use crate::{
    cli::{create_spinner, DisasterArgs},
    daily::aggregate_daily,
    disaster::{label, Indicator},
    merge::{merge, write_merged, MergedSummary},
    parquet,
    reading::normalise,
    station,
};

pub fn disasters(args: &DisasterArgs) -> Result<Vec<PathBuf>> {
    let clean_path = output_path(&args.dir, CLEAN_TABLE);
    require_input(&clean_path, "Run `inmet-disasters preprocess` first")?;

    let bar = create_spinner("Loading station table...".to_string());
    let table = station::read_clean(&clean_path)
        .with_context(|| format!("Failed to read `{}`", clean_path.display()))?;
    bar.finish_with_message(format!("Station table loaded: {} rows", table.rows.len()));

    let bar = create_spinner("Parsing timestamps and values...".to_string());
    let hourly = normalise(&table).context("Failed to parse hourly readings")?;
    bar.finish_with_message(format!(
        "Parsed {} hourly readings",
        hourly.readings.len()
    ));
    for field in hourly.missing() {
        warn!("No `{}` column; `{}` stays empty", field.source_column(), field.name());
    }

    let bar = create_spinner("Resampling to daily values...".to_string());
    let daily = aggregate_daily(&hourly.readings);
    bar.finish_with_message(format!("Resampled to {} days", daily.len()));

    let bar = create_spinner("Labelling synthetic disasters...".to_string());
    let params = args.label_params();
    let indicators = label(&daily, &params);
    bar.finish_with_message(format!(
        "Labelled {} indicator days",
        indicators.days.len()
    ));
    info!(
        "Flooding days: {:?}",
        indicators.dates_with(Indicator::Flooding)
    );

    let merged = merge(&daily, &indicators);
    let merged_path = output_path(&args.dir, MERGED_TABLE);
    let parquet_path = output_path(&args.dir, MERGED_PARQUET);

    let bar = create_spinner("Saving merged table...".to_string());
    write_merged(&merged, &merged_path)
        .with_context(|| format!("Failed to write `{}`", merged_path.display()))?;
    parquet::save_merged(&merged, &parquet_path)
        .with_context(|| format!("Failed to write `{}`", parquet_path.display()))?;
    bar.finish_with_message("Merged table saved");

    print_summary(&MergedSummary::from_records(&merged), indicators.threshold);

    Ok(vec![merged_path, parquet_path])
}

fn print_summary(summary: &MergedSummary, threshold: Option<f64>) {
    let mm = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{:.2} mm", v));
    let celsius = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{:.2} °C", v));

    println!("Days: {}", summary.days);
    println!("Precipitation threshold: {}", mm(threshold));
    println!("Flooding days: {}", summary.flooding_days);
    println!("Landslide days: {}", summary.landslide_days);
    println!("Heavy rain days: {}", summary.heavy_rain_days);
    println!("Mean precipitation: {}", mm(summary.mean_precipitation_mm));
    println!("Max precipitation: {}", mm(summary.max_precipitation_mm));
    println!("Mean max temperature: {}", celsius(summary.mean_max_temperature_c));
    println!("Mean min temperature: {}", celsius(summary.mean_min_temperature_c));
}
