// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use artifacts::{
    BucketClient, Format, Loader, ObjectKey, ObjectStoreClient, Publisher, StagingArea,
    StoreCredentials,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Where credentials come from and the handles built from them
pub struct StoreContext {
    client: Arc<dyn ObjectStoreClient>,
    staging: StagingArea,
}

impl StoreContext {
    /// Read credentials from `config` if given, otherwise from the environment
    pub fn connect(config: Option<PathBuf>) -> Result<Self> {
        let credentials = match config {
            Some(path) => {
                log::debug!("Reading store configuration from {}", path.display());
                StoreCredentials::from_yaml_file(&path)?
            }
            None => StoreCredentials::from_env()?,
        };
        let client = BucketClient::connect(&credentials)?;
        Ok(Self::with_client(Arc::new(client), StagingArea::from_env()))
    }

    pub fn with_client(client: Arc<dyn ObjectStoreClient>, staging: StagingArea) -> Self {
        Self { client, staging }
    }

    pub fn client(&self) -> &dyn ObjectStoreClient {
        self.client.as_ref()
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.client.clone(), self.staging.clone())
    }

    pub fn publisher(&self) -> Publisher {
        Publisher::new(self.client.clone(), self.staging.clone())
    }
}

/// Explicit format, or the one implied by the key's extension
pub fn resolve_format(key: &ObjectKey, explicit: Option<Format>) -> Result<Format> {
    explicit
        .or_else(|| Format::from_key(key))
        .ok_or_else(|| anyhow!("Cannot infer format of {key}; pass --format"))
}
