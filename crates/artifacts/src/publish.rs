// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Result publishing
//!
//! The write-side mirror of the loader, without a cache. A computed result is
//! encoded into a staged file (tables as CSV, everything else as JSON),
//! uploaded under `<namespace>/<kind>/<name>`, and the staged file is removed
//! whether or not the upload succeeded.

use crate::{Format, ObjectKey, ObjectStoreClient, PublishError, StagingArea, Table};
use std::sync::Arc;

/// `chrono` format for default timestamps, e.g. `20240315_142501`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    Table(Table),
    Json(serde_json::Value),
}

/// A computed result and the model type that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: String,
    pub payload: ArtifactPayload,
}

impl Artifact {
    pub fn table(kind: impl Into<String>, table: Table) -> Self {
        Self {
            kind: kind.into(),
            payload: ArtifactPayload::Table(table),
        }
    }

    pub fn json(kind: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload: ArtifactPayload::Json(value),
        }
    }

    /// Encoding used on upload, and therefore the format to load it back with
    pub fn format(&self) -> Format {
        match self.payload {
            ArtifactPayload::Table(_) => Format::Csv,
            ArtifactPayload::Json(_) => Format::Json,
        }
    }

    fn encode(&self) -> Result<Vec<u8>, PublishError> {
        match &self.payload {
            ArtifactPayload::Table(table) => {
                let mut buffer = Vec::new();
                table.write_csv(&mut buffer)?;
                Ok(buffer)
            }
            ArtifactPayload::Json(value) => Ok(serde_json::to_vec(value)?),
        }
    }
}

#[derive(Clone)]
pub struct Publisher {
    client: Arc<dyn ObjectStoreClient>,
    staging: StagingArea,
}

impl Publisher {
    pub fn new(client: Arc<dyn ObjectStoreClient>, staging: StagingArea) -> Self {
        Self { client, staging }
    }

    /// Key an artifact would be published under.
    ///
    /// Without a name hint the name is `<kind>_results_<timestamp>.<csv|json>`.
    pub fn resolve_key(
        namespace: &str,
        artifact: &Artifact,
        name_hint: Option<&str>,
        timestamp: &str,
    ) -> ObjectKey {
        let name = match name_hint {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!(
                "{}_results_{}.{}",
                artifact.kind,
                timestamp,
                artifact.format().name()
            ),
        };
        ObjectKey::new(namespace).join(&artifact.kind).join(&name)
    }

    /// Encode, stage, upload and clean up. Returns the key written.
    pub async fn publish(
        &self,
        namespace: &str,
        artifact: &Artifact,
        name_hint: Option<&str>,
        timestamp_hint: Option<&str>,
    ) -> Result<ObjectKey, PublishError> {
        let timestamp = match timestamp_hint {
            Some(ts) => ts.to_string(),
            None => chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let key = Self::resolve_key(namespace, artifact, name_hint, &timestamp);

        let encoded = artifact.encode()?;
        let handle = self.staging.acquire(key.file_name().unwrap_or_default())?;

        let outcome = match tokio::fs::write(handle.path(), &encoded).await {
            Ok(()) => self
                .client
                .upload(handle.path(), &key, true)
                .await
                .map_err(PublishError::from),
            Err(source) => Err(PublishError::Staging(crate::StagingError {
                name: key.to_string(),
                source,
            })),
        };
        handle.release();

        outcome?;
        log::info!("Published {} results to {}", artifact.kind, key);
        Ok(key)
    }
}
