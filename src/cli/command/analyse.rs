//! Stage 3: correlation matrix, key correlations and charts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::{RGBColor, BLUE, GREEN, RED};
use tracing::{info, warn};

use super::{
    output_path, require_input, CORRELATION_MATRIX, HEATMAP_CHART, MERGED_TABLE,
    PRECIPITATION_CHART, TEMPERATURE_CHART,
};
use crate::{
    cli::{create_spinner, AnalyseArgs},
    correlation::{correlate, CorrelationMatrix, Variable},
    disaster::Indicator,
    merge::{read_merged, MergedRecord},
    plot::{render_heatmap, render_series, save_svg, SeriesChart},
    reading::ClimateField,
};

const ORANGE: RGBColor = RGBColor(255, 140, 0);

pub fn analyse(args: &AnalyseArgs) -> Result<Vec<PathBuf>> {
    let merged_path = output_path(&args.dir, MERGED_TABLE);
    require_input(
        &merged_path,
        "Run `inmet-disasters preprocess` and then `inmet-disasters disasters` first",
    )?;

    let bar = create_spinner("Loading merged table...".to_string());
    let records = read_merged(&merged_path)
        .with_context(|| format!("Failed to read `{}`", merged_path.display()))?;
    bar.finish_with_message(format!("Merged table loaded: {} days", records.len()));

    let bar = create_spinner("Computing correlation matrix...".to_string());
    let matrix = correlate(&records);
    let matrix_path = output_path(&args.dir, CORRELATION_MATRIX);
    matrix
        .write_csv(&matrix_path)
        .with_context(|| format!("Failed to write `{}`", matrix_path.display()))?;
    bar.finish_with_message("Correlation matrix saved");
    info!("Correlation matrix:\n{}", matrix);

    print_key_correlations(&matrix);

    let mut outputs = vec![matrix_path];
    if args.no_plots {
        return Ok(outputs);
    }
    if records.is_empty() {
        warn!("No daily records; skipping charts");
        return Ok(outputs);
    }

    let bar = create_spinner("Rendering charts...".to_string());
    outputs.extend(render_charts(&args.dir, &matrix, &records).context("Failed to render charts")?);
    bar.finish_with_message("Charts rendered");

    Ok(outputs)
}

fn render_charts(
    dir: &Path,
    matrix: &CorrelationMatrix,
    records: &[MergedRecord],
) -> Result<Vec<PathBuf>> {
    let heatmap_path = output_path(dir, HEATMAP_CHART);
    let svg = render_heatmap(
        matrix,
        "Correlation between daily climate and disaster indicators",
    )?;
    save_svg(&svg, &heatmap_path)?;

    let precipitation_path = output_path(dir, PRECIPITATION_CHART);
    let svg = render_series(
        records,
        &SeriesChart {
            title: "Daily precipitation and flooding",
            field: ClimateField::Precipitation,
            y_label: "Precipitation (mm)",
            line_color: BLUE,
            marker: Indicator::Flooding,
            marker_color: RED,
        },
    )?;
    save_svg(&svg, &precipitation_path)?;

    let temperature_path = output_path(dir, TEMPERATURE_CHART);
    let svg = render_series(
        records,
        &SeriesChart {
            title: "Daily maximum temperature and landslides",
            field: ClimateField::MaxTemperature,
            y_label: "Maximum temperature (°C)",
            line_color: ORANGE,
            marker: Indicator::Landslide,
            marker_color: GREEN,
        },
    )?;
    save_svg(&svg, &temperature_path)?;

    Ok(vec![heatmap_path, precipitation_path, temperature_path])
}

fn print_key_correlations(matrix: &CorrelationMatrix) {
    let pairs = [
        (ClimateField::Precipitation, Indicator::Flooding),
        (ClimateField::Precipitation, Indicator::Landslide),
        (ClimateField::Precipitation, Indicator::HeavyRain),
        (ClimateField::MaxTemperature, Indicator::Flooding),
        (ClimateField::MinTemperature, Indicator::Flooding),
    ];

    println!("Key correlations:");
    for (field, indicator) in pairs {
        if let Some(r) = matrix.get(Variable::Climate(field), Variable::Indicator(indicator)) {
            println!("  {} vs {}: {:.3}", field.name(), indicator.name(), r);
        }
    }
}
