//! Synthetic disaster indicators derived from daily precipitation.
//!
//! These labels are manufactured, not observed: flooding and heavy rain mark
//! every day above a precipitation quantile, and landslides are a seeded
//! random sample of rainy days.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rand::{rngs::StdRng, seq::index, SeedableRng};
use tracing::info;

use crate::daily::DailyClimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Flooding,
    Landslide,
    HeavyRain,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Flooding, Indicator::Landslide, Indicator::HeavyRain];

    pub fn name(self) -> &'static str {
        match self {
            Indicator::Flooding => "flooding",
            Indicator::Landslide => "landslide",
            Indicator::HeavyRain => "heavy_rain",
        }
    }
}

/// Binary indicator flags for one day, stored as 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorFlags {
    pub flooding: u8,
    pub landslide: u8,
    pub heavy_rain: u8,
}

impl IndicatorFlags {
    pub fn get(&self, indicator: Indicator) -> u8 {
        match indicator {
            Indicator::Flooding => self.flooding,
            Indicator::Landslide => self.landslide,
            Indicator::HeavyRain => self.heavy_rain,
        }
    }
}

/// Calendar covered by the indicator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSpan {
    /// 1 Jan of the first to 31 Dec of the last year in the climate table.
    CoveredYears,
    /// 1 Jan to 31 Dec of a fixed year.
    Year(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelParams {
    pub seed: u64,
    pub percentile: f64,
    pub rain_day_mm: f64,
    pub max_landslides: usize,
    pub span: IndicatorSpan,
}

impl Default for LabelParams {
    fn default() -> Self {
        LabelParams {
            seed: 42,
            percentile: 0.95,
            rain_day_mm: 5.0,
            max_landslides: 5,
            span: IndicatorSpan::CoveredYears,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisasterIndicators {
    /// Precipitation quantile above which a day floods; `None` when no day
    /// has a precipitation value.
    pub threshold: Option<f64>,
    pub days: BTreeMap<NaiveDate, IndicatorFlags>,
}

impl DisasterIndicators {
    pub fn get(&self, date: NaiveDate) -> Option<IndicatorFlags> {
        self.days.get(&date).copied()
    }

    pub fn dates_with(&self, indicator: Indicator) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|(_, flags)| flags.get(indicator) == 1)
            .map(|(date, _)| *date)
            .collect()
    }
}

/// Builds the indicator table for the calendar selected by `params.span`.
pub fn label(daily: &[DailyClimate], params: &LabelParams) -> DisasterIndicators {
    let mut days: BTreeMap<NaiveDate, IndicatorFlags> = calendar(daily, params.span)
        .into_iter()
        .map(|date| (date, IndicatorFlags::default()))
        .collect();

    let precipitation: Vec<f64> = daily
        .iter()
        .filter_map(|d| d.values.precipitation_mm)
        .collect();
    let threshold = quantile(&precipitation, params.percentile);

    if let Some(threshold) = threshold {
        info!("Precipitation threshold (q={}): {:.2} mm", params.percentile, threshold);
        for day in daily {
            if day.values.precipitation_mm.is_some_and(|mm| mm > threshold) {
                if let Some(flags) = days.get_mut(&day.date) {
                    flags.flooding = 1;
                    flags.heavy_rain = 1;
                }
            }
        }
    }

    let rain_days: Vec<NaiveDate> = daily
        .iter()
        .filter(|d| d.values.precipitation_mm.is_some_and(|mm| mm > params.rain_day_mm))
        .map(|d| d.date)
        .collect();
    let landslide_days = sample_days(&rain_days, params.max_landslides, params.seed);
    info!(
        "Landslides on {} of {} rain days: {:?}",
        landslide_days.len(),
        rain_days.len(),
        landslide_days
    );

    for date in landslide_days {
        if let Some(flags) = days.get_mut(&date) {
            flags.landslide = 1;
        }
    }

    DisasterIndicators { threshold, days }
}

/// Draws `min(max, days.len())` distinct days with a generator seeded from
/// `seed`. The same input and seed always select the same days.
pub fn sample_days(days: &[NaiveDate], max: usize, seed: u64) -> Vec<NaiveDate> {
    let amount = max.min(days.len());
    if amount == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    index::sample(&mut rng, days.len(), amount)
        .into_iter()
        .map(|i| days[i])
        .collect()
}

/// Quantile with linear interpolation between the two nearest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn calendar(daily: &[DailyClimate], span: IndicatorSpan) -> Vec<NaiveDate> {
    let (first_year, last_year) = match span {
        IndicatorSpan::Year(year) => (year, year),
        IndicatorSpan::CoveredYears => match (daily.first(), daily.last()) {
            (Some(first), Some(last)) => (first.date.year(), last.date.year()),
            _ => return Vec::new(),
        },
    };

    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(first_year, 1, 1),
        NaiveDate::from_ymd_opt(last_year, 12, 31),
    ) else {
        return Vec::new();
    };

    start.iter_days().take_while(|d| *d <= end).collect()
}

// -- Tests -------------------------------------------------------------------
