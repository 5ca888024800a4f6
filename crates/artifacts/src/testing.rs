// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test utilities and fixtures
//!
//! An in-memory bucket, a client wrapper that counts calls per operation, and
//! small tables shaped like the dashboard's datasets.

use crate::{BucketClient, ObjectKey, ObjectStoreClient, Result, Table};
use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use async_trait::async_trait;
use bytes::Bytes;
use datafusion::parquet::arrow::ArrowWriter;
use object_store::memory::InMemory;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A client over a fresh in-memory bucket
pub fn memory_client() -> BucketClient {
    BucketClient::with_store("test-bucket", Arc::new(InMemory::new()))
}

/// Per-operation call counters
#[derive(Debug, Default)]
struct Counters {
    exists: AtomicUsize,
    downloads: AtomicUsize,
    get_bytes: AtomicUsize,
    uploads: AtomicUsize,
    lists: AtomicUsize,
    deletes: AtomicUsize,
}

/// Spy wrapper that counts every call before delegating
#[derive(Debug)]
pub struct CountingClient {
    inner: BucketClient,
    counters: Counters,
    download_delay: Option<Duration>,
}

impl CountingClient {
    pub fn new(inner: BucketClient) -> Self {
        Self {
            inner,
            counters: Counters::default(),
            download_delay: None,
        }
    }

    /// Sleep before each download, widening race windows in concurrency tests
    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    /// The wrapped client; calls through it are not counted
    pub fn inner(&self) -> &BucketClient {
        &self.inner
    }

    pub fn downloads(&self) -> usize {
        self.counters.downloads.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.counters.uploads.load(Ordering::SeqCst)
    }

    /// Total calls of any kind
    pub fn total_calls(&self) -> usize {
        let c = &self.counters;
        [&c.exists, &c.downloads, &c.get_bytes, &c.uploads, &c.lists, &c.deletes]
            .iter()
            .map(|n| n.load(Ordering::SeqCst))
            .sum()
    }
}

#[async_trait]
impl ObjectStoreClient for CountingClient {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn exists(&self, key: &ObjectKey) -> bool {
        let _ = self.counters.exists.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key).await
    }

    async fn download(&self, key: &ObjectKey, destination: &Path) -> Result<()> {
        let _ = self.counters.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.download(key, destination).await
    }

    async fn get_bytes(&self, key: &ObjectKey) -> Result<Bytes> {
        let _ = self.counters.get_bytes.fetch_add(1, Ordering::SeqCst);
        self.inner.get_bytes(key).await
    }

    async fn upload(&self, source: &Path, key: &ObjectKey, overwrite: bool) -> Result<()> {
        let _ = self.counters.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload(source, key, overwrite).await
    }

    async fn upload_bytes(&self, key: &ObjectKey, payload: Bytes) -> Result<()> {
        let _ = self.counters.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload_bytes(key, payload).await
    }

    async fn list_keys(&self, prefix: &str) -> Vec<ObjectKey> {
        let _ = self.counters.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_keys(prefix).await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        let _ = self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}

/// Three rows shaped like `user_food_proportion`: user_id, type, proportion
pub fn sample_table() -> Table {
    let schema = Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Int64, true),
        Field::new("type", DataType::Utf8, true),
        Field::new("proportion", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec!["fruit", "legume", "viande"])),
            Arc::new(Float64Array::from(vec![0.25, 0.5, 0.125])),
        ],
    );
    match batch {
        Ok(batch) => Table::from_batch(batch),
        Err(e) => unreachable!("fixed fixture schema: {e}"),
    }
}

/// Encode a table as a parquet file in memory
pub fn parquet_bytes(table: &Table) -> std::result::Result<Bytes, ArrowError> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, table.schema().clone(), None)
        .map_err(|e| ArrowError::ExternalError(Box::new(e)))?;
    for batch in table.batches() {
        writer
            .write(batch)
            .map_err(|e| ArrowError::ExternalError(Box::new(e)))?;
    }
    let _metadata = writer
        .close()
        .map_err(|e| ArrowError::ExternalError(Box::new(e)))?;
    Ok(Bytes::from(buffer))
}
