// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Remote dataset access for the nutrition analytics dashboard
//!
//! Batch jobs write their outputs (aggregated tables, clustering and anomaly
//! results, recommender outputs) into an S3 bucket. This crate is the read and
//! publish path the dashboard uses for those artifacts.
//!
//! # Architecture
//!
//! - **ObjectStoreClient**: existence, upload, download, delete and list against one bucket
//! - **StagingArea**: scoped local files that are removed on every exit path
//! - **Loader**: download into staging, parse by [`Format`], return a [`LoadResult`]
//! - **ResultCache**: memoizes loads per `(key, format)` for the process lifetime
//! - **Publisher**: encodes a computed result and uploads it under a namespaced key
//!
//! Failures below the loader are typed errors. The loader and cache collapse
//! them into [`LoadResult::Unavailable`] so callers branch on a value instead of
//! handling errors from deep inside the stack.
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use artifacts::{BucketClient, Format, Loader, ObjectKey, ResultCache, StagingArea, StoreCredentials};
//!
//! let credentials = StoreCredentials::from_env()?;
//! let client = Arc::new(BucketClient::connect(&credentials)?);
//! let cache = ResultCache::new(Loader::new(client, StagingArea::from_env()));
//!
//! let key = ObjectKey::new("AI/anomaly_detection/results/model_statistics.json");
//! let stats = cache.get_or_load(&key, Format::Json).await;
//! if let Some(value) = stats.as_json() {
//!     println!("{}", value["general_statistics"]["anomaly_rate"]);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod catalog;
mod client;
mod config;
mod error;
mod format;
mod key;
mod loader;
mod publish;
mod spreadsheet;
mod staging;
mod table;
pub mod taxonomy;
pub mod testing;

pub use cache::{CacheStats, ResultCache};
pub use client::{BucketClient, ObjectStoreClient};
pub use config::{STAGING_DIR_VAR, StoreCredentials};
pub use error::{ConfigError, ParseError, PublishError, StagingError, StoreError};
pub use format::Format;
pub use key::ObjectKey;
pub use loader::{Dataset, LoadResult, Loaded, Loader, QUERY_TABLE, parse_file};
pub use publish::{Artifact, ArtifactPayload, Publisher, TIMESTAMP_FORMAT};
pub use staging::{StagingArea, StagingHandle};
pub use table::Table;

/// Result type for object store operations
pub type Result<T> = std::result::Result<T, StoreError>;
