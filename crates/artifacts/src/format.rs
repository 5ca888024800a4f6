// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::ObjectKey;
use std::fmt;

/// Declared encoding of a stored artifact.
///
/// The loader never sniffs content; callers choose the format, usually from
/// the key's extension via [`Format::from_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    /// Columnar snapshot (parquet)
    Parquet,
    /// Workbook; the first sheet is read
    Spreadsheet,
    /// Nested JSON document
    Json,
    /// Comma separated text with a header row
    Csv,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Parquet, Format::Spreadsheet, Format::Json, Format::Csv];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "parquet" => Some(Format::Parquet),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Format::Spreadsheet),
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }

    pub fn from_key(key: &ObjectKey) -> Option<Self> {
        key.extension().and_then(|ext| Self::from_extension(&ext))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Parquet => "parquet",
            Format::Spreadsheet => "spreadsheet",
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }

    /// Whether the format decodes into a [`crate::Table`]
    pub fn is_tabular(&self) -> bool {
        !matches!(self, Format::Json)
    }

    /// Whether the query engine can read the format directly
    pub fn is_queryable(&self) -> bool {
        matches!(self, Format::Parquet | Format::Csv)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_extension(s))
            .ok_or_else(|| format!("unknown format '{s}' (expected parquet, spreadsheet, json or csv)"))
    }
}
