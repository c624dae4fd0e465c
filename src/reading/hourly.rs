//! Hourly readings: timestamps and numeric values from a station table.

use std::num::ParseFloatError;

use chrono::NaiveDateTime;
use tracing::debug;

use super::{ClimateField, ClimateValues};
use crate::{
    error::{PipelineError, Result},
    station::StationTable,
};

pub const DATE_COLUMN: &str = "Data";
pub const HOUR_COLUMN: &str = "Hora UTC";
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H%M";

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyReading {
    pub timestamp: NaiveDateTime,
    pub values: ClimateValues,
}

/// Hourly readings plus the canonical fields whose source column was present.
/// Fields outside `present` are `None` in every reading.
#[derive(Debug, Clone, Default)]
pub struct HourlyTable {
    pub present: Vec<ClimateField>,
    pub readings: Vec<HourlyReading>,
}

impl HourlyTable {
    pub fn missing(&self) -> Vec<ClimateField> {
        ClimateField::ALL
            .into_iter()
            .filter(|f| !self.present.contains(f))
            .collect()
    }
}

/// Parses `Data` (`YYYY/MM/DD`) and `Hora UTC` (`HHMM UTC`) into one timestamp.
pub fn parse_timestamp(date: &str, hour: &str) -> Option<NaiveDateTime> {
    let hour = hour.replace(" UTC", "");
    let combined = format!("{} {}", date.trim(), hour.trim());
    NaiveDateTime::parse_from_str(&combined, TIMESTAMP_FORMAT).ok()
}

/// Parses a decimal written with a comma separator. Empty text and
/// non-finite values (`NaN`, `inf`) are missing readings, not errors.
pub fn parse_decimal(s: &str) -> std::result::Result<Option<f64>, ParseFloatError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let value = s.replace(',', ".").parse::<f64>()?;
    Ok(value.is_finite().then_some(value))
}

/// Converts every row of the table into an [`HourlyReading`].
///
/// Any row with a malformed timestamp or a non-numeric measurement aborts the
/// whole conversion.
pub fn normalise(table: &StationTable) -> Result<HourlyTable> {
    let date_idx = table
        .column_index(DATE_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn(DATE_COLUMN.to_string()))?;
    let hour_idx = table
        .column_index(HOUR_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn(HOUR_COLUMN.to_string()))?;

    let mut columns = Vec::new();
    for field in ClimateField::ALL {
        match table.column_index(field.source_column()) {
            Some(idx) => {
                debug!("{} <- column {} `{}`", field.name(), idx, field.source_column());
                columns.push((field, idx));
            }
            None => debug!("Column not found: `{}`", field.source_column()),
        }
    }

    let mut readings = Vec::with_capacity(table.rows.len());

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = i + 1;
        let date = row.get(date_idx).unwrap_or_default();
        let hour = row.get(hour_idx).unwrap_or_default();

        let timestamp = parse_timestamp(date, hour).ok_or_else(|| PipelineError::Timestamp {
            row: row_number,
            value: format!("{} {}", date, hour),
        })?;

        let mut values = ClimateValues::default();
        for &(field, idx) in &columns {
            let raw = row.get(idx).unwrap_or_default();
            let value = parse_decimal(raw).map_err(|_| PipelineError::Number {
                row: row_number,
                column: field.source_column().to_string(),
                value: raw.to_string(),
            })?;
            values.set(field, value);
        }

        readings.push(HourlyReading { timestamp, values });
    }

    Ok(HourlyTable {
        present: columns.into_iter().map(|(field, _)| field).collect(),
        readings,
    })
}

// -- Tests ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use csv::StringRecord;

    use super::*;

    fn table_fixture(headers: &[&str], rows: &[&[&str]]) -> StationTable {
        StationTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    #[test]
    fn should_parse_timestamp() {
        let ts = parse_timestamp("2023/03/14", "1500 UTC").unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 3, 14)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();

        assert_eq!(ts, expected);
        assert_eq!(parse_timestamp("2023/03/14", "1500 UTC"), Some(ts));
    }

    #[test]
    fn should_reject_other_timestamp_layouts() {
        assert!(parse_timestamp("2023-03-14", "1500 UTC").is_none());
        assert!(parse_timestamp("2023/03/14", "15:00").is_none());
        assert!(parse_timestamp("2023/02/30", "0000 UTC").is_none());
    }

    #[test]
    fn should_parse_decimal_comma() {
        assert_eq!(parse_decimal("12,5"), Ok(Some(12.5)));
        assert_eq!(parse_decimal("12.5"), Ok(Some(12.5)));
        assert_eq!(parse_decimal("-3"), Ok(Some(-3.0)));
        assert_eq!(parse_decimal(""), Ok(None));
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn should_treat_non_finite_values_as_missing() {
        assert_eq!(parse_decimal("NaN"), Ok(None));
        assert_eq!(parse_decimal("inf"), Ok(None));
        assert_eq!(parse_decimal("-inf"), Ok(None));

        let table = table_fixture(
            &["Data", "Hora UTC", "PRECIPITAÇÃO TOTAL, HORÁRIO (mm)"],
            &[&["2023/01/01", "0000 UTC", "NaN"], &["2023/01/01", "0100 UTC", "1,5"]],
        );
        let hourly = normalise(&table).unwrap();

        assert_eq!(hourly.readings[0].values.precipitation_mm, None);
        assert_eq!(hourly.readings[1].values.precipitation_mm, Some(1.5));
    }

    #[test]
    fn should_be_idempotent_on_dotted_decimals() {
        let once = parse_decimal("7,25").unwrap().unwrap();
        let twice = parse_decimal(&once.to_string()).unwrap().unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn should_normalise_present_columns() {
        let table = table_fixture(
            &["Data", "Hora UTC", "PRECIPITAÇÃO TOTAL, HORÁRIO (mm)", "UMIDADE RELATIVA DO AR, HORARIA (%)"],
            &[
                &["2023/01/01", "0000 UTC", "0,2", "81"],
                &["2023/01/01", "0100 UTC", "", "79"],
            ],
        );

        let hourly = normalise(&table).unwrap();

        assert_eq!(hourly.present, vec![ClimateField::Precipitation, ClimateField::Humidity]);
        assert_eq!(
            hourly.missing(),
            vec![
                ClimateField::MaxTemperature,
                ClimateField::MinTemperature,
                ClimateField::WindGust
            ]
        );
        assert_eq!(hourly.readings.len(), 2);
        assert_eq!(hourly.readings[0].values.precipitation_mm, Some(0.2));
        assert_eq!(hourly.readings[1].values.precipitation_mm, None);
        assert_eq!(hourly.readings[1].values.relative_humidity_pct, Some(79.0));
        assert_eq!(hourly.readings[1].values.max_temperature_c, None);
    }

    #[test]
    fn should_abort_on_bad_timestamp() {
        let table = table_fixture(
            &["Data", "Hora UTC"],
            &[&["2023/01/01", "0000 UTC"], &["2023/01/01", "25:00"]],
        );

        let err = normalise(&table).unwrap_err();

        assert!(matches!(err, PipelineError::Timestamp { row: 2, .. }));
    }

    #[test]
    fn should_abort_on_non_numeric_value() {
        let table = table_fixture(
            &["Data", "Hora UTC", "VENTO, RAJADA MAXIMA (m/s)"],
            &[&["2023/01/01", "0000 UTC", "n/a"]],
        );

        let err = normalise(&table).unwrap_err();

        assert!(matches!(err, PipelineError::Number { row: 1, .. }));
    }

    #[test]
    fn should_require_date_and_hour_columns() {
        let table = table_fixture(&["Data"], &[]);

        let err = normalise(&table).unwrap_err();

        assert!(matches!(err, PipelineError::MissingColumn(c) if c == HOUR_COLUMN));
    }
}
