// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for artifact access

use crate::ObjectKey;
use thiserror::Error;

/// Configuration problems detected before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing AWS credentials: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Failed to build S3 client: {0}")]
    Client(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed store call.
///
/// `exists` and `list_keys` never return these; they collapse every failure
/// into `false` or an empty listing.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(ObjectKey),

    #[error("Object already exists: {0}")]
    AlreadyExists(ObjectKey),

    #[error("Invalid object key {key}: {source}")]
    InvalidKey {
        key: ObjectKey,
        #[source]
        source: object_store::path::Error,
    },

    #[error("Object store error for {key}: {source}")]
    Service {
        key: ObjectKey,
        #[source]
        source: object_store::Error,
    },

    #[error("Local I/O error for {key}: {source}")]
    Io {
        key: ObjectKey,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Map an `object_store` error, keeping not-found and conflicts distinct
    pub(crate) fn from_store(key: &ObjectKey, source: object_store::Error) -> Self {
        match source {
            object_store::Error::NotFound { .. } => StoreError::NotFound(key.clone()),
            object_store::Error::AlreadyExists { .. } => StoreError::AlreadyExists(key.clone()),
            source => StoreError::Service {
                key: key.clone(),
                source,
            },
        }
    }

    pub(crate) fn io(key: &ObjectKey, source: std::io::Error) -> Self {
        StoreError::Io {
            key: key.clone(),
            source,
        }
    }
}

#[derive(Error, Debug)]
#[error("Failed to stage {name}: {source}")]
pub struct StagingError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

/// Failure to turn a staged file into a table or JSON value
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet has no sheet or no header row")]
    EmptySheet,

    #[error("{0} files cannot be queried with SQL")]
    NotQueryable(crate::Format),

    #[error("Staged path is not valid UTF-8: {0}")]
    InvalidPath(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("Failed to encode artifact: {0}")]
    Encode(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for PublishError {
    fn from(e: serde_json::Error) -> Self {
        PublishError::Encode(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for PublishError {
    fn from(e: arrow::error::ArrowError) -> Self {
        PublishError::Encode(e.to_string())
    }
}
