//! Resampling hourly readings onto a continuous daily calendar.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::reading::{ClimateField, ClimateValues, HourlyReading, Reduction};

#[derive(Debug, Clone, PartialEq)]
pub struct DailyClimate {
    pub date: NaiveDate,
    pub values: ClimateValues,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    total: f64,
    count: usize,
    max: Option<f64>,
    min: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
    }

    fn finish(&self, reduction: Reduction) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        match reduction {
            Reduction::Sum => Some(self.total),
            Reduction::Max => self.max,
            Reduction::Min => self.min,
            Reduction::Mean => Some(self.total / self.count as f64),
        }
    }
}

/// Collapses hourly readings into one record per calendar day, from the
/// earliest to the latest reading's date with no gaps. A day without any
/// reading for a field gets `None` for that field.
pub fn aggregate_daily(readings: &[HourlyReading]) -> Vec<DailyClimate> {
    let mut days: BTreeMap<NaiveDate, [Accumulator; 5]> = BTreeMap::new();

    for reading in readings {
        let accumulators = days.entry(reading.timestamp.date()).or_default();
        for (acc, field) in accumulators.iter_mut().zip(ClimateField::ALL) {
            if let Some(value) = reading.values.get(field) {
                acc.push(value);
            }
        }
    }

    let (Some(&first), Some(&last)) = (days.keys().next(), days.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let mut values = ClimateValues::default();
            if let Some(accumulators) = days.get(&date) {
                for (acc, field) in accumulators.iter().zip(ClimateField::ALL) {
                    values.set(field, acc.finish(field.reduction()));
                }
            }
            DailyClimate { date, values }
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(date: (i32, u32, u32), hour: u32, values: ClimateValues) -> HourlyReading {
        HourlyReading {
            timestamp: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            values,
        }
    }

    fn precipitation(mm: f64) -> ClimateValues {
        ClimateValues {
            precipitation_mm: Some(mm),
            ..Default::default()
        }
    }

    fn max_temperature(c: f64) -> ClimateValues {
        ClimateValues {
            max_temperature_c: Some(c),
            ..Default::default()
        }
    }

    #[test]
    fn should_sum_precipitation() {
        let readings: Vec<_> = [0.0, 0.0, 5.0, 0.0]
            .iter()
            .enumerate()
            .map(|(h, &mm)| reading((2023, 1, 1), h as u32, precipitation(mm)))
            .collect();

        let daily = aggregate_daily(&readings);

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].values.precipitation_mm, Some(5.0));
    }

    #[test]
    fn should_take_max_temperature() {
        let readings: Vec<_> = [28.4, 30.1, 29.0]
            .iter()
            .enumerate()
            .map(|(h, &c)| reading((2023, 1, 1), h as u32, max_temperature(c)))
            .collect();

        let daily = aggregate_daily(&readings);

        assert_eq!(daily[0].values.max_temperature_c, Some(30.1));
    }

    #[test]
    fn should_reduce_each_field_independently() {
        let readings = vec![
            reading(
                (2023, 5, 2),
                0,
                ClimateValues {
                    precipitation_mm: Some(1.5),
                    max_temperature_c: Some(27.0),
                    min_temperature_c: Some(22.0),
                    relative_humidity_pct: Some(80.0),
                    max_wind_gust_ms: Some(6.1),
                },
            ),
            reading(
                (2023, 5, 2),
                1,
                ClimateValues {
                    precipitation_mm: Some(2.0),
                    max_temperature_c: Some(26.0),
                    min_temperature_c: Some(21.5),
                    relative_humidity_pct: Some(90.0),
                    max_wind_gust_ms: Some(9.4),
                },
            ),
        ];

        let day = &aggregate_daily(&readings)[0];

        assert_eq!(day.values.precipitation_mm, Some(3.5));
        assert_eq!(day.values.max_temperature_c, Some(27.0));
        assert_eq!(day.values.min_temperature_c, Some(21.5));
        assert_eq!(day.values.relative_humidity_pct, Some(85.0));
        assert_eq!(day.values.max_wind_gust_ms, Some(9.4));
    }

    #[test]
    fn should_fill_gap_days_with_missing_values() {
        let readings = vec![
            reading((2023, 1, 1), 12, precipitation(0.0)),
            reading((2023, 1, 3), 12, precipitation(2.0)),
        ];

        let daily = aggregate_daily(&readings);

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(daily[1].values, ClimateValues::default());
        assert_eq!(daily[0].values.precipitation_mm, Some(0.0));
    }

    #[test]
    fn should_combine_duplicate_timestamps() {
        let readings = vec![
            reading((2023, 1, 1), 6, precipitation(1.0)),
            reading((2023, 1, 1), 6, precipitation(1.0)),
        ];

        let daily = aggregate_daily(&readings);

        assert_eq!(daily[0].values.precipitation_mm, Some(2.0));
    }

    #[test]
    fn should_accept_unsorted_readings() {
        let readings = vec![
            reading((2023, 1, 2), 0, precipitation(1.0)),
            reading((2023, 1, 1), 0, precipitation(3.0)),
        ];

        let daily = aggregate_daily(&readings);

        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(daily[0].values.precipitation_mm, Some(3.0));
    }

    #[test]
    fn should_return_empty_for_no_readings() {
        assert!(aggregate_daily(&[]).is_empty());
    }
}
