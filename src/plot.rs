//! SVG charts of the correlation matrix and the daily series.

use std::{fmt::Display, io::Write, ops::Range, path::Path};

use chrono::{Duration, NaiveDate};
use plotters::{
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontTransform,
    },
};

use crate::{
    artifact::write_atomically,
    correlation::CorrelationMatrix,
    disaster::Indicator,
    error::{PipelineError, Result},
    merge::MergedRecord,
    reading::ClimateField,
};

const CELL: i32 = 72;
const LABEL_AREA: i32 = 190;
const TOP: i32 = 50;
const NAN_COLOR: RGBColor = RGBColor(200, 200, 200);

/// Which climate series to draw and which indicator days to mark on it.
#[derive(Debug, Clone, Copy)]
pub struct SeriesChart<'a> {
    pub title: &'a str,
    pub field: ClimateField,
    pub y_label: &'a str,
    pub line_color: RGBColor,
    pub marker: Indicator,
    pub marker_color: RGBColor,
}

pub fn save_svg(svg: &str, path: &Path) -> Result<()> {
    write_atomically(path, |file| {
        file.write_all(svg.as_bytes())?;
        Ok(())
    })
}

/// Annotated heatmap of the matrix on a blue-white-red scale.
pub fn render_heatmap(matrix: &CorrelationMatrix, title: &str) -> Result<String> {
    let n = matrix.variables.len() as i32;
    let size = (
        (LABEL_AREA + n * CELL + 20) as u32,
        (TOP + n * CELL + LABEL_AREA) as u32,
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let centred = Pos::new(HPos::Center, VPos::Center);
        let title_style = TextStyle::from(("sans-serif", 20).into_font()).pos(centred);
        root.draw(&Text::new(title.to_string(), (size.0 as i32 / 2, TOP / 2), title_style))
            .map_err(plot_error)?;

        let value_style = TextStyle::from(("sans-serif", 14).into_font()).pos(centred);
        for (i, row) in matrix.values.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let x = LABEL_AREA + j as i32 * CELL;
                let y = TOP + i as i32 * CELL;
                root.draw(&Rectangle::new(
                    [(x, y), (x + CELL, y + CELL)],
                    diverging_color(*value).filled(),
                ))
                .map_err(plot_error)?;
                root.draw(&Rectangle::new([(x, y), (x + CELL, y + CELL)], WHITE.stroke_width(1)))
                    .map_err(plot_error)?;

                let text = if value.is_nan() {
                    "NaN".to_string()
                } else {
                    format!("{:.2}", value)
                };
                root.draw(&Text::new(text, (x + CELL / 2, y + CELL / 2), value_style.clone()))
                    .map_err(plot_error)?;
            }
        }

        let row_style =
            TextStyle::from(("sans-serif", 13).into_font()).pos(Pos::new(HPos::Right, VPos::Center));
        let column_style = TextStyle::from(
            ("sans-serif", 13)
                .into_font()
                .transform(FontTransform::Rotate270),
        )
        .pos(Pos::new(HPos::Right, VPos::Center));
        for (k, variable) in matrix.variables.iter().enumerate() {
            let offset = k as i32 * CELL + CELL / 2;
            root.draw(&Text::new(
                variable.name().to_string(),
                (LABEL_AREA - 8, TOP + offset),
                row_style.clone(),
            ))
            .map_err(plot_error)?;
            root.draw(&Text::new(
                variable.name().to_string(),
                (LABEL_AREA + offset, TOP + n * CELL + 8),
                column_style.clone(),
            ))
            .map_err(plot_error)?;
        }

        root.present().map_err(plot_error)?;
    }

    Ok(svg)
}

/// Daily line of `chart.field` with the days flagged by `chart.marker` drawn
/// as points. Missing values break the line.
pub fn render_series(records: &[MergedRecord], chart: &SeriesChart) -> Result<String> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(PipelineError::Plot("no daily records to plot".to_string()));
    };
    let date_range = Range {
        start: first.date,
        end: last.date + Duration::days(1),
    };
    let ranged_date: RangedDate<NaiveDate> = date_range.into();
    let y_range = value_range(records.iter().filter_map(|r| r.climate(chart.field)));

    let mut svg = String::new();
    {
        let size = (1200u32, 560u32);
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title, ("sans-serif", 20))
            .margin(20i32)
            .x_label_area_size(40u32)
            .y_label_area_size(60u32)
            .build_cartesian_2d(ranged_date, y_range)
            .map_err(plot_error)?;

        ctx.configure_mesh()
            .x_labels(12_usize)
            .x_desc("Date")
            .y_desc(chart.y_label)
            .draw()
            .map_err(plot_error)?;

        for (k, run) in contiguous_runs(records, chart.field).into_iter().enumerate() {
            let series = ctx
                .draw_series(LineSeries::new(run, chart.line_color.stroke_width(2)))
                .map_err(plot_error)?;
            if k == 0 {
                let color = chart.line_color;
                series
                    .label(chart.y_label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }

        let marked: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|r| r.indicator(chart.marker) == 1)
            .filter_map(|r| Some((r.date, r.climate(chart.field)?)))
            .collect();
        if !marked.is_empty() {
            let color = chart.marker_color;
            ctx.draw_series(marked.iter().map(|point| Circle::new(*point, 5, color.filled())))
                .map_err(plot_error)?
                .label(chart.marker.name())
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }

    Ok(svg)
}

fn contiguous_runs(records: &[MergedRecord], field: ClimateField) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for record in records {
        match record.climate(field) {
            Some(value) => current.push((record.date, value)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }

    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}

/// Blue for -1, near-white for 0, red for +1, grey for NaN.
fn diverging_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return NAN_COLOR;
    }

    let blue = (59.0, 76.0, 192.0);
    let white = (221.0, 221.0, 221.0);
    let red = (180.0, 4.0, 38.0);

    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 {
        (white, blue, -t)
    } else {
        (white, red, t)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * f).round() as u8;

    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn plot_error<E: Display>(e: E) -> PipelineError {
    PipelineError::Plot(e.to_string())
}

// -- Tests -------------------------------------------------------------------
