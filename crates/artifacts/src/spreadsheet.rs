// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Workbook decoding
//!
//! Reads the first sheet of an xlsx/xls/ods workbook into an Arrow table.
//! The first row supplies column names. Each column gets the narrowest type
//! that holds every non-empty cell:
//! - all integers, or floats that are all whole numbers: Int64
//! - any other mix of integers and floats: Float64
//! - all booleans: Boolean
//! - anything else: Utf8 (dates rendered as `YYYY-MM-DD HH:MM:SS`)

use crate::{ParseError, Table};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use calamine::{Data, DataType as _, Range, Reader};
use std::path::Path;
use std::sync::Arc;

static EMPTY: Data = Data::Empty;

/// Largest magnitude an f64 holds without losing integer precision (2^53)
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

pub(crate) fn read_first_sheet(path: &Path) -> Result<Table, ParseError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::EmptySheet)??;
    range_to_table(&range)
}

pub(crate) fn range_to_table(range: &Range<Data>) -> Result<Table, ParseError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(ParseError::EmptySheet)?;
    if header.iter().all(|cell| matches!(cell, Data::Empty)) {
        return Err(ParseError::EmptySheet);
    }

    let body: Vec<&[Data]> = rows.collect();

    let mut fields = Vec::with_capacity(header.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(header.len());
    for (idx, name_cell) in header.iter().enumerate() {
        let name = match name_cell {
            Data::Empty => format!("column_{idx}"),
            cell => cell_text(cell),
        };
        let cells: Vec<&Data> = body.iter().map(|row| row.get(idx).unwrap_or(&EMPTY)).collect();
        let (data_type, array) = build_column(&cells);
        fields.push(Field::new(name, data_type, true));
        columns.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema, columns)?;
    Ok(Table::from_batch(batch))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_kind(cells: &[&Data]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for cell in cells {
        let cell_kind = match cell {
            Data::Empty => continue,
            Data::Int(_) => ColumnKind::Int,
            Data::Float(_) => ColumnKind::Float,
            Data::Bool(_) => ColumnKind::Bool,
            _ => return ColumnKind::Text,
        };
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int), ColumnKind::Float) | (Some(ColumnKind::Float), ColumnKind::Int) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        });
    }
    match kind {
        // xlsx stores every number as a float; ids and counts come back whole
        Some(ColumnKind::Float) if cells.iter().all(|cell| is_whole(cell)) => ColumnKind::Int,
        Some(kind) => kind,
        None => ColumnKind::Text,
    }
}

fn is_whole(cell: &Data) -> bool {
    match cell {
        Data::Float(v) => v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT,
        _ => true,
    }
}

fn build_column(cells: &[&Data]) -> (DataType, ArrayRef) {
    match infer_kind(cells) {
        ColumnKind::Int => {
            let values: Int64Array = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    _ => None,
                })
                .collect();
            (DataType::Int64, Arc::new(values))
        }
        ColumnKind::Float => {
            let values: Float64Array = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            (DataType::Float64, Arc::new(values))
        }
        ColumnKind::Bool => {
            let values: BooleanArray = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            (DataType::Boolean, Arc::new(values))
        }
        ColumnKind::Text => {
            let values: StringArray = cells
                .iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    cell => Some(cell_text(cell)),
                })
                .collect();
            (DataType::Utf8, Arc::new(values))
        }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
