// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use std::io::Write;

/// In-memory table decoded from a stored artifact.
///
/// Batches share Arrow buffers, so cloning a table out of the cache does not
/// copy column data.
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name().as_str()).collect()
    }

    /// All rows in a single batch
    pub fn concat(&self) -> Result<RecordBatch, ArrowError> {
        arrow::compute::concat_batches(&self.schema, &self.batches)
    }

    /// Render as an ASCII table, optionally truncated to `limit` rows
    pub fn pretty(&self, limit: Option<usize>) -> Result<String, ArrowError> {
        let batch = self.concat()?;
        let batch = match limit {
            Some(n) if n < batch.num_rows() => batch.slice(0, n),
            _ => batch,
        };
        Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
    }

    /// Write as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ArrowError> {
        let mut writer = arrow_csv::WriterBuilder::new()
            .with_header(true)
            .build(writer);
        for batch in &self.batches {
            writer.write(batch)?;
        }
        Ok(())
    }
}

/// Structural equality: same column names and types, same values in the same
/// order. Batch boundaries, nullability flags and schema metadata are ignored.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        let same_shape = self.num_columns() == other.num_columns()
            && self
                .schema
                .fields()
                .iter()
                .zip(other.schema.fields().iter())
                .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type());
        if !same_shape || self.num_rows() != other.num_rows() {
            return false;
        }

        match (self.concat(), other.concat()) {
            (Ok(a), Ok(b)) => a.columns() == b.columns(),
            _ => false,
        }
    }
}
