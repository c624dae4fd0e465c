//! Pearson correlation between climate variables and disaster indicators.

use std::{fmt, path::Path};

use statrs::statistics::Statistics;

use crate::{
    artifact::write_atomically,
    disaster::Indicator,
    error::Result,
    merge::MergedRecord,
    reading::ClimateField,
};

/// A column of the merged table taking part in the correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Climate(ClimateField),
    Indicator(Indicator),
}

impl Variable {
    pub const ALL: [Variable; 8] = [
        Variable::Climate(ClimateField::Precipitation),
        Variable::Climate(ClimateField::MaxTemperature),
        Variable::Climate(ClimateField::MinTemperature),
        Variable::Climate(ClimateField::Humidity),
        Variable::Climate(ClimateField::WindGust),
        Variable::Indicator(Indicator::Flooding),
        Variable::Indicator(Indicator::Landslide),
        Variable::Indicator(Indicator::HeavyRain),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variable::Climate(field) => field.name(),
            Variable::Indicator(indicator) => indicator.name(),
        }
    }

    pub fn value(self, record: &MergedRecord) -> Option<f64> {
        match self {
            Variable::Climate(field) => record.climate(field),
            Variable::Indicator(indicator) => Some(f64::from(record.indicator(indicator))),
        }
    }
}

/// Square, symmetric matrix indexed in [`Variable::ALL`] order. Cells are
/// NaN where either column has fewer than two paired values or no variance.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub variables: Vec<Variable>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Variable, b: Variable) -> Option<f64> {
        let i = self.variables.iter().position(|v| *v == a)?;
        let j = self.variables.iter().position(|v| *v == b)?;
        Some(self.values[i][j])
    }

    /// Writes the matrix as CSV with variable names as row and column labels.
    /// NaN cells are left empty.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        write_atomically(path, |file| {
            let mut writer = csv::Writer::from_writer(file);

            let mut header = vec![String::new()];
            header.extend(self.variables.iter().map(|v| v.name().to_string()));
            writer.write_record(&header)?;

            for (variable, row) in self.variables.iter().zip(&self.values) {
                let mut line = vec![variable.name().to_string()];
                line.extend(row.iter().map(|v| {
                    if v.is_nan() {
                        String::new()
                    } else {
                        v.to_string()
                    }
                }));
                writer.write_record(&line)?;
            }

            writer.flush()?;
            Ok(())
        })
    }
}

/// Fixed-width console table.
impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.variables.iter().map(|v| v.name().len()).fold(0, usize::max);

        write!(f, "{:width$}", "", width = width)?;
        for v in &self.variables {
            write!(f, " {:>10.10}", v.name())?;
        }
        writeln!(f)?;
        for (v, row) in self.variables.iter().zip(&self.values) {
            write!(f, "{:width$}", v.name(), width = width)?;
            for value in row {
                write!(f, " {:>10.3}", value)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Computes the pairwise-complete Pearson correlation of every pair in
/// [`Variable::ALL`].
pub fn correlate(records: &[MergedRecord]) -> CorrelationMatrix {
    let variables = Variable::ALL.to_vec();
    let columns: Vec<Vec<Option<f64>>> = variables
        .iter()
        .map(|v| records.iter().map(|r| v.value(r)).collect())
        .collect();

    let n = variables.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = columns[i]
                .iter()
                .zip(&columns[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            let mut r = pearson(&xs, &ys);
            if i == j && !r.is_nan() {
                r = 1.0;
            }
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { variables, values }
}

/// Pearson correlation coefficient of paired samples, clamped to [-1, 1].
/// NaN for fewer than two pairs or a constant side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return f64::NAN;
    }

    let var_x = xs.iter().variance();
    let var_y = ys.iter().variance();
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (xs.iter().covariance(ys.iter()) / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

// Exact comparison: rounding in a running variance can leave a constant
// column with a tiny non-zero spread.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn records_fixture() -> Vec<MergedRecord> {
        let rows = [
            (Some(0.0), Some(30.0), Some(22.0), None, 0),
            (Some(2.0), Some(29.0), Some(22.5), None, 0),
            (Some(40.0), Some(26.0), Some(21.0), None, 1),
            (None, Some(31.0), Some(23.0), None, 0),
            (Some(1.0), Some(30.5), None, None, 0),
        ];

        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .iter_days()
            .zip(rows)
            .map(|(date, (p, tmax, tmin, rh, flood))| MergedRecord {
                date,
                precipitation_mm: p,
                max_temperature_c: tmax,
                min_temperature_c: tmin,
                relative_humidity_pct: rh,
                max_wind_gust_ms: Some(5.0),
                flooding: flood,
                landslide: 0,
                heavy_rain: flood,
            })
            .collect()
    }

    #[test]
    fn should_compute_pearson() {
        let xs = [1.0, 2.0, 3.0];

        assert!((pearson(&xs, &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[1.0, 3.0, 2.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn should_return_nan_without_variance() {
        assert!(pearson(&[1.0, 2.0], &[1.0, 1.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn should_return_nan_for_constant_inexact_decimals() {
        let index: Vec<f64> = (0..7).map(f64::from).collect();

        for value in [29.9, 0.1, 23.3, 85.3] {
            for n in 2..=7 {
                let constant = vec![value; n];
                assert!(pearson(&constant, &index[..n]).is_nan(), "{} x {}", value, n);
                assert!(pearson(&constant, &constant).is_nan(), "{} x {}", value, n);
            }
        }
    }

    #[test]
    fn should_keep_nan_diagonal_for_constant_decimal_column() {
        let records: Vec<MergedRecord> = records_fixture()
            .into_iter()
            .map(|r| MergedRecord {
                max_wind_gust_ms: Some(29.9),
                ..r
            })
            .collect();
        let gust = Variable::Climate(ClimateField::WindGust);
        let tmax = Variable::Climate(ClimateField::MaxTemperature);

        let matrix = correlate(&records);

        assert!(matrix.get(gust, gust).unwrap().is_nan());
        assert!(matrix.get(gust, tmax).unwrap().is_nan());
    }

    #[test]
    fn should_build_symmetric_matrix() {
        let matrix = correlate(&records_fixture());

        assert_eq!(matrix.variables.len(), 8);
        assert_eq!(matrix.values.len(), 8);
        for i in 0..8 {
            for j in 0..8 {
                let (a, b) = (matrix.values[i][j], matrix.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
                assert!(a.is_nan() || (-1.0..=1.0).contains(&a));
            }
        }
    }

    #[test]
    fn should_set_unit_diagonal_for_varying_columns() {
        let matrix = correlate(&records_fixture());
        let precipitation = Variable::Climate(ClimateField::Precipitation);
        let flooding = Variable::Indicator(Indicator::Flooding);

        assert_eq!(matrix.get(precipitation, precipitation), Some(1.0));
        assert_eq!(matrix.get(flooding, flooding), Some(1.0));
    }

    #[test]
    fn should_propagate_nan_for_constant_or_missing_columns() {
        let matrix = correlate(&records_fixture());
        let humidity = Variable::Climate(ClimateField::Humidity);
        let gust = Variable::Climate(ClimateField::WindGust);
        let landslide = Variable::Indicator(Indicator::Landslide);
        let precipitation = Variable::Climate(ClimateField::Precipitation);

        assert!(matrix.get(humidity, humidity).unwrap().is_nan());
        assert!(matrix.get(gust, precipitation).unwrap().is_nan());
        assert!(matrix.get(landslide, landslide).unwrap().is_nan());
    }

    #[test]
    fn should_use_pairwise_complete_rows() {
        let records = records_fixture();
        let matrix = correlate(&records);
        let precipitation = Variable::Climate(ClimateField::Precipitation);
        let tmax = Variable::Climate(ClimateField::MaxTemperature);

        let (xs, ys): (Vec<f64>, Vec<f64>) = records
            .iter()
            .filter_map(|r| Some((r.precipitation_mm?, r.max_temperature_c?)))
            .unzip();
        let expected = pearson(&xs, &ys);
        assert_eq!(xs.len(), 4);

        assert_eq!(matrix.get(precipitation, tmax), Some(expected));
        assert!(expected < 0.0);
    }

    #[test]
    fn should_write_matrix_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("correlation.csv");
        let matrix = correlate(&records_fixture());

        matrix.write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with(",precipitation_mm,max_temperature_c"));
        assert!(lines[1].starts_with("precipitation_mm,1,"));
        assert!(lines[4].starts_with("relative_humidity_pct,,"));
    }

    #[test]
    fn should_render_console_table() {
        let table = correlate(&records_fixture()).to_string();

        assert_eq!(table.lines().count(), 9);
        assert!(table.contains("heavy_rain"));
    }
}
