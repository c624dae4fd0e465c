//! Reading the raw station export and the cleaned table derived from it.

use std::{fs, path::Path};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use super::StationMetadata;
use crate::{
    artifact::write_atomically,
    error::{PipelineError, Result},
};

/// Number of metadata lines preceding the header row of an export.
pub const METADATA_LINES: usize = 8;

/// Header row and data rows of a station table, in file order.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl StationTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Reads a semicolon separated, ISO-8859-1 encoded INMET export.
pub fn read_export(path: &Path) -> Result<(StationMetadata, StationTable)> {
    let bytes = fs::read(path)?;
    let text = decode_latin1(&bytes);

    let (metadata, body) = split_metadata(&text)?;
    let table = read_table(body.as_bytes(), b';')?;
    debug!(
        "Export `{}`: {} columns, {} rows",
        path.display(),
        table.headers.len(),
        table.rows.len()
    );

    Ok((metadata, table))
}

/// Writes the table as comma separated UTF-8, header row included.
pub fn write_clean(table: &StationTable, path: &Path) -> Result<()> {
    write_atomically(path, |file| {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(file);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Reads a table previously written by [`write_clean`].
pub fn read_clean(path: &Path) -> Result<StationTable> {
    let file = fs::File::open(path)?;
    read_table(file, b',')
}

fn read_table<R: std::io::Read>(reader: R, delimiter: u8) -> Result<StationTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(StationTable { headers, rows })
}

fn split_metadata(text: &str) -> Result<(StationMetadata, &str)> {
    let mut lines = Vec::with_capacity(METADATA_LINES);
    let mut rest = text;

    for _ in 0..METADATA_LINES {
        let Some(end) = rest.find('\n') else {
            return Err(PipelineError::MalformedExport(format!(
                "expected {} metadata lines before the header row, found {}",
                METADATA_LINES,
                lines.len()
            )));
        };
        lines.push(rest[..end].trim_end_matches('\r'));
        rest = &rest[end + 1..];
    }

    if rest.trim().is_empty() {
        return Err(PipelineError::MalformedExport(
            "no header row after the metadata lines".to_string(),
        ));
    }

    Ok((StationMetadata::from_lines(lines), rest))
}

/// First `count` lines of a raw export, decoded and cut to `width` characters.
pub fn preview_lines(path: &Path, count: usize, width: usize) -> Result<Vec<String>> {
    let text = decode_latin1(&fs::read(path)?);
    Ok(text
        .lines()
        .take(count)
        .map(|line| line.chars().take(width).collect())
        .collect())
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
pub(crate) fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).expect("character outside latin-1"))
        .collect()
}

// -- Tests -------------------------------------------------------------------
