pub mod field;
pub mod hourly;

pub use field::{ClimateField, ClimateValues, Reduction};
pub use hourly::{normalise, parse_decimal, HourlyReading};
