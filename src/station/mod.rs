//! The INMET station export: metadata block and tabular body.

pub mod export;
pub mod metadata;

pub use export::{preview_lines, read_clean, read_export, write_clean, StationTable};
pub use metadata::StationMetadata;
