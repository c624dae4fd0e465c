//! Save the merged daily table to a parquet file.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Date32Builder, Float64Builder, Int32Builder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use parquet::{
    arrow::ArrowWriter,
    basic::{Compression, ZstdLevel},
    file::properties::WriterProperties,
};

use crate::{
    artifact::write_atomically,
    disaster::Indicator,
    error::Result,
    merge::MergedRecord,
    reading::ClimateField,
};

// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn save_merged(records: &[MergedRecord], file_path: &Path) -> Result<()> {
    let mut fields = vec![Field::new("date", DataType::Date32, false)];
    fields.extend(
        ClimateField::ALL
            .iter()
            .map(|f| Field::new(f.name(), DataType::Float64, true)),
    );
    fields.extend(
        Indicator::ALL
            .iter()
            .map(|i| Field::new(i.name(), DataType::Int32, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut date_builder = Date32Builder::with_capacity(records.len());
    let mut climate_builders: Vec<Float64Builder> = ClimateField::ALL
        .iter()
        .map(|_| Float64Builder::with_capacity(records.len()))
        .collect();
    let mut indicator_builders: Vec<Int32Builder> = Indicator::ALL
        .iter()
        .map(|_| Int32Builder::with_capacity(records.len()))
        .collect();

    for record in records {
        date_builder.append_value(record.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
        for (builder, field) in climate_builders.iter_mut().zip(ClimateField::ALL) {
            builder.append_option(record.climate(field));
        }
        for (builder, indicator) in indicator_builders.iter_mut().zip(Indicator::ALL) {
            builder.append_value(i32::from(record.indicator(indicator)));
        }
    }

    let mut columns: Vec<ArrayRef> = vec![Arc::new(date_builder.finish())];
    columns.extend(
        climate_builders
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef),
    );
    columns.extend(
        indicator_builders
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();

    write_atomically(file_path, |file| {
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    })
}

// -- Tests -------------------------------------------------------------------
