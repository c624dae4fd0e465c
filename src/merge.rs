//! Joining daily climate with disaster indicators, and the merged table file.

use std::{fs::File, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::{
    artifact::write_atomically,
    daily::DailyClimate,
    disaster::{DisasterIndicators, Indicator, IndicatorFlags},
    error::Result,
    reading::{ClimateField, ClimateValues},
};

/// One calendar day of the merged table. Field names double as CSV headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub precipitation_mm: Option<f64>,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub max_wind_gust_ms: Option<f64>,
    pub flooding: u8,
    pub landslide: u8,
    pub heavy_rain: u8,
}

impl MergedRecord {
    pub fn new(date: NaiveDate, values: ClimateValues, flags: IndicatorFlags) -> Self {
        MergedRecord {
            date,
            precipitation_mm: values.precipitation_mm,
            max_temperature_c: values.max_temperature_c,
            min_temperature_c: values.min_temperature_c,
            relative_humidity_pct: values.relative_humidity_pct,
            max_wind_gust_ms: values.max_wind_gust_ms,
            flooding: flags.flooding,
            landslide: flags.landslide,
            heavy_rain: flags.heavy_rain,
        }
    }

    pub fn climate(&self, field: ClimateField) -> Option<f64> {
        match field {
            ClimateField::Precipitation => self.precipitation_mm,
            ClimateField::MaxTemperature => self.max_temperature_c,
            ClimateField::MinTemperature => self.min_temperature_c,
            ClimateField::Humidity => self.relative_humidity_pct,
            ClimateField::WindGust => self.max_wind_gust_ms,
        }
    }

    pub fn indicator(&self, indicator: Indicator) -> u8 {
        match indicator {
            Indicator::Flooding => self.flooding,
            Indicator::Landslide => self.landslide,
            Indicator::HeavyRain => self.heavy_rain,
        }
    }
}

/// Left join on date: every climate day appears once, and days without an
/// indicator entry get all-zero flags. Climate values are never filled.
pub fn merge(daily: &[DailyClimate], indicators: &DisasterIndicators) -> Vec<MergedRecord> {
    daily
        .iter()
        .map(|day| {
            let flags = indicators.get(day.date).unwrap_or_default();
            MergedRecord::new(day.date, day.values, flags)
        })
        .collect()
}

pub fn write_merged(records: &[MergedRecord], path: &Path) -> Result<()> {
    write_atomically(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    })
}

pub fn read_merged(path: &Path) -> Result<Vec<MergedRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<MergedRecord>, _>>()?;

    Ok(records)
}

/// Counts and climate statistics reported after merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSummary {
    pub days: usize,
    pub flooding_days: usize,
    pub landslide_days: usize,
    pub heavy_rain_days: usize,
    pub mean_precipitation_mm: Option<f64>,
    pub max_precipitation_mm: Option<f64>,
    pub mean_max_temperature_c: Option<f64>,
    pub mean_min_temperature_c: Option<f64>,
}

impl MergedSummary {
    pub fn from_records(records: &[MergedRecord]) -> Self {
        let count = |indicator: Indicator| {
            records
                .iter()
                .filter(|r| r.indicator(indicator) == 1)
                .count()
        };
        let column = |field: ClimateField| records.iter().filter_map(move |r| r.climate(field));

        MergedSummary {
            days: records.len(),
            flooding_days: count(Indicator::Flooding),
            landslide_days: count(Indicator::Landslide),
            heavy_rain_days: count(Indicator::HeavyRain),
            mean_precipitation_mm: mean(column(ClimateField::Precipitation)),
            max_precipitation_mm: column(ClimateField::Precipitation).reduce(f64::max),
            mean_max_temperature_c: mean(column(ClimateField::MaxTemperature)),
            mean_min_temperature_c: mean(column(ClimateField::MinTemperature)),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    (!values.is_empty()).then(|| values.iter().mean())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_fixture() -> Vec<DailyClimate> {
        vec![
            DailyClimate {
                date: date(2022, 12, 31),
                values: ClimateValues {
                    precipitation_mm: Some(40.0),
                    max_temperature_c: Some(31.0),
                    ..Default::default()
                },
            },
            DailyClimate {
                date: date(2023, 1, 1),
                values: ClimateValues {
                    precipitation_mm: Some(12.5),
                    max_temperature_c: Some(29.5),
                    min_temperature_c: Some(23.0),
                    ..Default::default()
                },
            },
            DailyClimate {
                date: date(2023, 1, 2),
                values: ClimateValues::default(),
            },
        ]
    }

    fn indicators_fixture() -> DisasterIndicators {
        let mut indicators = DisasterIndicators::default();
        for day in date(2023, 1, 1).iter_days().take(365) {
            indicators.days.insert(day, IndicatorFlags::default());
        }
        indicators.days.insert(
            date(2023, 1, 1),
            IndicatorFlags {
                flooding: 1,
                landslide: 1,
                heavy_rain: 1,
            },
        );
        indicators
    }

    #[test]
    fn should_left_join_on_date() {
        let daily = daily_fixture();
        let merged = merge(&daily, &indicators_fixture());

        assert_eq!(merged.len(), daily.len());
        for (record, day) in merged.iter().zip(&daily) {
            assert_eq!(record.date, day.date);
        }
        // outside the indicator calendar
        assert_eq!(merged[0].flooding, 0);
        assert_eq!(merged[0].precipitation_mm, Some(40.0));
        assert_eq!(merged[1].flooding, 1);
        assert_eq!(merged[1].landslide, 1);
        // climate gaps stay missing
        assert_eq!(merged[2].precipitation_mm, None);
        assert_eq!(merged[2].heavy_rain, 0);
    }

    #[test]
    fn should_write_and_read_merged_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merged.csv");
        let merged = merge(&daily_fixture(), &indicators_fixture());

        write_merged(&merged, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,precipitation_mm,max_temperature_c,min_temperature_c,relative_humidity_pct,max_wind_gust_ms,flooding,landslide,heavy_rain"
        );
        assert_eq!(lines.next().unwrap(), "2022-12-31,40.0,31.0,,,,0,0,0");

        assert_eq!(read_merged(&path).unwrap(), merged);
    }

    #[test]
    fn should_summarise_records() {
        let merged = merge(&daily_fixture(), &indicators_fixture());

        let summary = MergedSummary::from_records(&merged);

        assert_eq!(summary.days, 3);
        assert_eq!(summary.flooding_days, 1);
        assert_eq!(summary.landslide_days, 1);
        assert_eq!(summary.heavy_rain_days, 1);
        assert_eq!(summary.mean_precipitation_mm, Some(26.25));
        assert_eq!(summary.max_precipitation_mm, Some(40.0));
        assert_eq!(summary.mean_max_temperature_c, Some(30.25));
        assert_eq!(summary.mean_min_temperature_c, Some(23.0));
    }
}
