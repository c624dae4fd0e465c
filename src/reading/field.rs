//! Canonical climate fields and their station export columns.

/// A canonical climate measurement carried through every stage after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClimateField {
    Precipitation,
    MaxTemperature,
    MinTemperature,
    Humidity,
    WindGust,
}

/// How hourly readings of a field collapse into one daily value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Max,
    Min,
    Mean,
}

impl ClimateField {
    pub const ALL: [ClimateField; 5] = [
        ClimateField::Precipitation,
        ClimateField::MaxTemperature,
        ClimateField::MinTemperature,
        ClimateField::Humidity,
        ClimateField::WindGust,
    ];

    /// Column label used by the INMET automatic station export.
    pub fn source_column(self) -> &'static str {
        match self {
            ClimateField::Precipitation => "PRECIPITAÇÃO TOTAL, HORÁRIO (mm)",
            ClimateField::MaxTemperature => "TEMPERATURA MÁXIMA NA HORA ANT. (AUT) (°C)",
            ClimateField::MinTemperature => "TEMPERATURA MÍNIMA NA HORA ANT. (AUT) (°C)",
            ClimateField::Humidity => "UMIDADE RELATIVA DO AR, HORARIA (%)",
            ClimateField::WindGust => "VENTO, RAJADA MAXIMA (m/s)",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClimateField::Precipitation => "precipitation_mm",
            ClimateField::MaxTemperature => "max_temperature_c",
            ClimateField::MinTemperature => "min_temperature_c",
            ClimateField::Humidity => "relative_humidity_pct",
            ClimateField::WindGust => "max_wind_gust_ms",
        }
    }

    pub fn reduction(self) -> Reduction {
        match self {
            ClimateField::Precipitation => Reduction::Sum,
            ClimateField::MaxTemperature => Reduction::Max,
            ClimateField::MinTemperature => Reduction::Min,
            ClimateField::Humidity => Reduction::Mean,
            ClimateField::WindGust => Reduction::Max,
        }
    }
}

/// One value per canonical field. A field is `None` when its source column
/// is absent from the export or the reading itself is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateValues {
    pub precipitation_mm: Option<f64>,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub max_wind_gust_ms: Option<f64>,
}

impl ClimateValues {
    pub fn get(&self, field: ClimateField) -> Option<f64> {
        match field {
            ClimateField::Precipitation => self.precipitation_mm,
            ClimateField::MaxTemperature => self.max_temperature_c,
            ClimateField::MinTemperature => self.min_temperature_c,
            ClimateField::Humidity => self.relative_humidity_pct,
            ClimateField::WindGust => self.max_wind_gust_ms,
        }
    }

    pub fn set(&mut self, field: ClimateField, value: Option<f64>) {
        let slot = match field {
            ClimateField::Precipitation => &mut self.precipitation_mm,
            ClimateField::MaxTemperature => &mut self.max_temperature_c,
            ClimateField::MinTemperature => &mut self.min_temperature_c,
            ClimateField::Humidity => &mut self.relative_humidity_pct,
            ClimateField::WindGust => &mut self.max_wind_gust_ms,
        };
        *slot = value;
    }
}
