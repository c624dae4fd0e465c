//! Station metadata from the header block of an INMET export.
//!
//! The block is eight `KEY:;value` lines, e.g. `LATITUDE:;-10,95055555`.

use chrono::NaiveDate;

use crate::reading::parse_decimal;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StationMetadata {
    pub region: Option<String>,
    pub state: Option<String>,
    pub name: Option<String>,
    pub wmo_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub founded: Option<NaiveDate>,
}

impl StationMetadata {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut metadata = StationMetadata::default();

        for line in lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim_start_matches(';').trim_end_matches(';').trim();

            match key.trim().to_uppercase().as_str() {
                "REGIAO" | "REGIÃO" => metadata.region = parse_str(value),
                "UF" => metadata.state = parse_str(value),
                "ESTACAO" | "ESTAÇÃO" => metadata.name = parse_str(value),
                "CODIGO (WMO)" | "CÓDIGO (WMO)" => metadata.wmo_code = parse_str(value),
                "LATITUDE" => metadata.latitude = parse_coordinate(value),
                "LONGITUDE" => metadata.longitude = parse_coordinate(value),
                "ALTITUDE" => metadata.altitude = parse_coordinate(value),
                "DATA DE FUNDACAO" | "DATA DE FUNDAÇÃO" => metadata.founded = parse_date(value),
                _ => {}
            }
        }

        metadata
    }
}

fn parse_coordinate(s: &str) -> Option<f64> {
    parse_decimal(s).ok().flatten()
}

fn parse_str(s: &str) -> Option<String> {
    Some(s.trim().to_string()).filter(|v| !v.is_empty())
}

// Older exports write the foundation date as dd/mm/yy.
fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

// -- Tests -------------------------------------------------------------------
