// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured loader
//!
//! `load` = stage, download, parse, release. Each call makes exactly one
//! download and materializes exactly one local file, which is gone again by
//! the time the call returns. Every failure becomes
//! [`LoadResult::Unavailable`] with a reason starting with one of
//! `"staging failed: "`, `"download failed: "` or `"parse failed: "`.

use crate::{Format, ObjectKey, ObjectStoreClient, ParseError, StagingArea, Table, spreadsheet};
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionConfig, SessionContext};
use std::path::Path;
use std::sync::Arc;

/// Name the staged file is registered under for SQL
pub const QUERY_TABLE: &str = "artifact";

const SELECT_ALL: &str = "SELECT * FROM artifact";

/// Decoded artifact contents
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Table(Table),
    Json(Arc<serde_json::Value>),
}

impl Dataset {
    /// Row count for provenance: table rows, JSON array length, otherwise 1
    pub fn rows(&self) -> usize {
        match self {
            Dataset::Table(table) => table.num_rows(),
            Dataset::Json(value) => value.as_array().map_or(1, Vec::len),
        }
    }
}

/// A successful load with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub key: ObjectKey,
    pub format: Format,
    pub rows: usize,
    pub value: T,
}

/// Outcome of a load: populated with provenance, or absent with a reason
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult<T> {
    Loaded(Loaded<T>),
    Unavailable { key: ObjectKey, reason: String },
}

impl<T> LoadResult<T> {
    fn unavailable(key: &ObjectKey, reason: String) -> Self {
        log::warn!("{} unavailable: {}", key, reason);
        LoadResult::Unavailable {
            key: key.clone(),
            reason,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResult::Loaded(_))
    }

    pub fn key(&self) -> &ObjectKey {
        match self {
            LoadResult::Loaded(loaded) => &loaded.key,
            LoadResult::Unavailable { key, .. } => key,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            LoadResult::Loaded(loaded) => Some(&loaded.value),
            LoadResult::Unavailable { .. } => None,
        }
    }

    pub fn rows(&self) -> Option<usize> {
        match self {
            LoadResult::Loaded(loaded) => Some(loaded.rows),
            LoadResult::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            LoadResult::Loaded(_) => None,
            LoadResult::Unavailable { reason, .. } => Some(reason),
        }
    }

    /// Convert to a `Result` whose error is the unavailability reason
    pub fn into_result(self) -> Result<Loaded<T>, String> {
        match self {
            LoadResult::Loaded(loaded) => Ok(loaded),
            LoadResult::Unavailable { key, reason } => Err(format!("{key}: {reason}")),
        }
    }
}

impl LoadResult<Dataset> {
    pub fn as_table(&self) -> Option<&Table> {
        match self.value()? {
            Dataset::Table(table) => Some(table),
            Dataset::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self.value()? {
            Dataset::Json(value) => Some(value),
            Dataset::Table(_) => None,
        }
    }
}

/// Fetch-and-parse over a shared client
#[derive(Clone)]
pub struct Loader {
    client: Arc<dyn ObjectStoreClient>,
    staging: StagingArea,
}

impl Loader {
    pub fn new(client: Arc<dyn ObjectStoreClient>, staging: StagingArea) -> Self {
        Self { client, staging }
    }

    pub fn client(&self) -> &Arc<dyn ObjectStoreClient> {
        &self.client
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Download `key` and decode it as `format`
    pub async fn load(&self, key: &ObjectKey, format: Format) -> LoadResult<Dataset> {
        let parsed = self
            .with_staged(key, |path| async move { parse_file(&path, format).await })
            .await;
        match parsed {
            Ok(dataset) => {
                let rows = dataset.rows();
                log::info!("Loaded {} as {} ({} rows)", key, format, rows);
                LoadResult::Loaded(Loaded {
                    key: key.clone(),
                    format,
                    rows,
                    value: dataset,
                })
            }
            Err(reason) => LoadResult::unavailable(key, reason),
        }
    }

    /// Download `key` and run `sql` against it, registered as table `artifact`.
    ///
    /// Only parquet and CSV are queryable. Results are not cached.
    pub async fn query(&self, key: &ObjectKey, format: Format, sql: &str) -> LoadResult<Table> {
        if !format.is_queryable() {
            return LoadResult::unavailable(
                key,
                format!("parse failed: {}", ParseError::NotQueryable(format)),
            );
        }

        let sql = sql.to_string();
        let parsed = self
            .with_staged(key, |path| async move { run_sql(&path, format, &sql).await })
            .await;
        match parsed {
            Ok(table) => LoadResult::Loaded(Loaded {
                key: key.clone(),
                format,
                rows: table.num_rows(),
                value: table,
            }),
            Err(reason) => LoadResult::unavailable(key, reason),
        }
    }

    /// Stage and download `key`, hand the staged path to `parse`, then release
    /// the staging directory whatever the outcome.
    async fn with_staged<T, F, Fut>(&self, key: &ObjectKey, parse: F) -> Result<T, String>
    where
        F: FnOnce(std::path::PathBuf) -> Fut,
        Fut: Future<Output = Result<T, ParseError>>,
    {
        let handle = self
            .staging
            .acquire(key.file_name().unwrap_or_default())
            .map_err(|e| format!("staging failed: {e}"))?;

        if let Err(e) = self.client.download(key, handle.path()).await {
            handle.release();
            return Err(format!("download failed: {e}"));
        }

        let parsed = parse(handle.path().to_path_buf()).await;
        handle.release();
        parsed.map_err(|e| format!("parse failed: {e}"))
    }
}

/// Decode a local file as `format`, the same way a staged download is decoded
pub async fn parse_file(path: &Path, format: Format) -> Result<Dataset, ParseError> {
    match format {
        Format::Json => {
            let bytes = tokio::fs::read(path).await?;
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            Ok(Dataset::Json(Arc::new(value)))
        }
        Format::Spreadsheet => {
            let path = path.to_path_buf();
            let table = tokio::task::spawn_blocking(move || spreadsheet::read_first_sheet(&path))
                .await
                .map_err(|e| ParseError::Io(std::io::Error::other(e)))??;
            Ok(Dataset::Table(table))
        }
        Format::Parquet | Format::Csv => Ok(Dataset::Table(run_sql(path, format, SELECT_ALL).await?)),
    }
}

fn session() -> SessionContext {
    let mut config = SessionConfig::new();
    // Keep strings as Utf8 so tables compare equal to what was written
    config.options_mut().execution.parquet.schema_force_view_types = false;
    SessionContext::new_with_config(config)
}

async fn run_sql(path: &Path, format: Format, sql: &str) -> Result<Table, ParseError> {
    let location = path
        .to_str()
        .ok_or_else(|| ParseError::InvalidPath(path.display().to_string()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let ctx = session();
    match format {
        Format::Parquet => {
            let options = ParquetReadOptions::default().file_extension(&extension);
            ctx.register_parquet(QUERY_TABLE, location, options).await?;
        }
        Format::Csv => {
            let options = CsvReadOptions::new()
                .has_header(true)
                .file_extension(&extension);
            ctx.register_csv(QUERY_TABLE, location, options).await?;
        }
        other => return Err(ParseError::NotQueryable(other)),
    }

    log::debug!("SQL: {}", sql);
    let df = ctx.sql(sql).await?;
    let schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    Ok(Table::new(schema, batches))
}
