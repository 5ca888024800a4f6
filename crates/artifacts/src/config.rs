// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Object store credentials
//!
//! Resolved once at process start, either from the environment or from a YAML
//! file, and read-only afterwards. The four required fields are checked before
//! any client is built:
//! - access_key_id: `AWS_ACCESS_KEY_ID`
//! - secret_access_key: `AWS_SECRET_ACCESS_KEY`
//! - region: `AWS_REGION`
//! - bucket: `S3_BUCKET_NAME`
//! - endpoint (optional): `S3_ENDPOINT`, for S3-compatible services

use crate::ConfigError;
use crate::taxonomy::{ApiKey, ApiSecret, ServiceEndpoint};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides the directory used for staging downloads
pub const STAGING_DIR_VAR: &str = "DASHDATA_STAGING_DIR";

const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
const REGION_VAR: &str = "AWS_REGION";
const BUCKET_VAR: &str = "S3_BUCKET_NAME";
const ENDPOINT_VAR: &str = "S3_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCredentials {
    #[serde(default)]
    pub access_key_id: ApiKey<String>,

    #[serde(default)]
    pub secret_access_key: ApiSecret<String>,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub bucket: String,

    /// Empty means the AWS endpoint for `region`
    #[serde(default)]
    pub endpoint: ServiceEndpoint<String>,
}

impl StoreCredentials {
    /// Build credentials from explicit values, failing if any required one is empty
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let credentials = Self {
            access_key_id: ApiKey::new(access_key_id.into()),
            secret_access_key: ApiSecret::new(secret_access_key.into()),
            region: region.into(),
            bucket: bucket.into(),
            endpoint: ServiceEndpoint::default(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = ServiceEndpoint::new(endpoint.into());
        self
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).unwrap_or_default();

        let credentials = Self {
            access_key_id: ApiKey::new(get(ACCESS_KEY_VAR)),
            secret_access_key: ApiSecret::new(get(SECRET_KEY_VAR)),
            region: get(REGION_VAR),
            bucket: get(BUCKET_VAR),
            endpoint: ServiceEndpoint::new(get(ENDPOINT_VAR)),
        };

        for (name, set) in credentials.presence() {
            log::debug!("{} is {}", name, if set { "set" } else { "not set" });
        }

        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let credentials: Self = serde_yaml_ng::from_str(&text)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {}", path.as_ref().display(), e)))?;
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = self
            .presence()
            .into_iter()
            .filter_map(|(name, set)| (!set).then_some(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            log::error!("Missing AWS credentials: {}", missing.join(", "));
            Err(ConfigError::Missing(missing))
        }
    }

    fn presence(&self) -> [(&'static str, bool); 4] {
        [
            (ACCESS_KEY_VAR, !self.access_key_id.as_declassified().trim().is_empty()),
            (SECRET_KEY_VAR, !self.secret_access_key.as_declassified().trim().is_empty()),
            (REGION_VAR, !self.region.trim().is_empty()),
            (BUCKET_VAR, !self.bucket.trim().is_empty()),
        ]
    }
}
