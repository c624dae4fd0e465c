//! Handles serialising and saving data to disk in the _parquet_ file format.

pub mod merged;

pub use merged::save_merged;
