// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Object store client
//!
//! [`ObjectStoreClient`] is the narrow contract the loader and publisher need
//! from the bucket. [`BucketClient`] implements it over any
//! `object_store::ObjectStore`, normally S3 built from [`StoreCredentials`].
//!
//! There are no retries and no multipart transfers. Service errors are logged
//! here and handed back as values; nothing in this module panics the caller.

use crate::{ConfigError, ObjectKey, Result, StoreCredentials, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::{ClientOptions, ObjectStore, PutPayload};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Bucket this client talks to
    fn bucket(&self) -> &str;

    /// `true` only when the object is known to exist.
    ///
    /// A service error (permissions, network) is logged and also reported as
    /// `false`; callers cannot tell it apart from a missing object.
    async fn exists(&self, key: &ObjectKey) -> bool;

    /// Write the object's bytes to `destination`, replacing any file there
    async fn download(&self, key: &ObjectKey, destination: &Path) -> Result<()>;

    /// Read a small object fully into memory
    async fn get_bytes(&self, key: &ObjectKey) -> Result<Bytes>;

    /// Upload a local file.
    ///
    /// The put is always unconditional. `overwrite` only adds an existence
    /// probe that logs when an object is being replaced.
    async fn upload(&self, source: &Path, key: &ObjectKey, overwrite: bool) -> Result<()>;

    /// Upload an in-memory payload, replacing any existing object
    async fn upload_bytes(&self, key: &ObjectKey, payload: Bytes) -> Result<()>;

    /// Keys starting with `prefix`, compared as plain strings, so `AI/clu`
    /// matches `AI/clustering/...`.
    ///
    /// Errors are logged and produce an empty listing.
    async fn list_keys(&self, prefix: &str) -> Vec<ObjectKey>;

    async fn delete(&self, key: &ObjectKey) -> Result<()>;
}

/// [`ObjectStoreClient`] over a single bucket
#[derive(Debug, Clone)]
pub struct BucketClient {
    bucket: String,
    store: Arc<dyn ObjectStore>,
}

impl BucketClient {
    /// Build an S3 client from validated credentials.
    ///
    /// No network call is made here.
    pub fn connect(credentials: &StoreCredentials) -> std::result::Result<Self, ConfigError> {
        credentials.validate()?;

        let client_options = ClientOptions::new().with_timeout(Duration::from_secs(30));

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&credentials.bucket)
            .with_region(&credentials.region)
            .with_access_key_id(credentials.access_key_id.as_declassified())
            .with_secret_access_key(credentials.secret_access_key.as_declassified())
            .with_client_options(client_options);

        let endpoint = credentials.endpoint.as_declassified();
        if !endpoint.is_empty() {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        log::info!(
            "Connected to bucket {} in {}",
            credentials.bucket,
            credentials.region
        );
        Ok(Self::with_store(credentials.bucket.clone(), Arc::new(store)))
    }

    /// Wrap an already-built store, e.g. `object_store::memory::InMemory`
    pub fn with_store(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    async fn put(&self, key: &ObjectKey, payload: Bytes) -> Result<()> {
        let size = payload.len();
        let location = key.to_path()?;
        match self.store.put(&location, PutPayload::from(payload)).await {
            Ok(_) => {
                log::info!("Uploaded {} bytes to {} in bucket {}", size, key, self.bucket);
                Ok(())
            }
            Err(e) => {
                let err = StoreError::from_store(key, e);
                log::error!("Error uploading {} to S3: {}", key, err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl ObjectStoreClient for BucketClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &ObjectKey) -> bool {
        let location = match key.to_path() {
            Ok(location) => location,
            Err(e) => {
                log::error!("Error checking existence of {}: {}", key, e);
                return false;
            }
        };
        match self.store.head(&location).await {
            Ok(_) => true,
            Err(object_store::Error::NotFound { .. }) => false,
            Err(e) => {
                log::error!("Error checking existence of {}: {}", key, e);
                false
            }
        }
    }

    async fn download(&self, key: &ObjectKey, destination: &Path) -> Result<()> {
        let bytes = self.get_bytes(key).await?;
        tokio::fs::write(destination, &bytes).await.map_err(|e| {
            log::error!("Error writing {} to {}: {}", key, destination.display(), e);
            StoreError::io(key, e)
        })?;
        log::info!("Downloaded {} from S3 to {}", key, destination.display());
        Ok(())
    }

    async fn get_bytes(&self, key: &ObjectKey) -> Result<Bytes> {
        let location = key.to_path()?;
        let fetched = match self.store.get(&location).await {
            Ok(result) => result.bytes().await,
            Err(e) => Err(e),
        };
        fetched.map_err(|e| {
            let err = StoreError::from_store(key, e);
            log::error!("Error downloading file from S3: {}", err);
            err
        })
    }

    async fn upload(&self, source: &Path, key: &ObjectKey, overwrite: bool) -> Result<()> {
        let payload = tokio::fs::read(source).await.map_err(|e| {
            log::error!("Error reading {} for upload: {}", source.display(), e);
            StoreError::io(key, e)
        })?;

        if overwrite && self.exists(key).await {
            log::info!("Overwriting existing object {}", key);
        }

        self.put(key, Bytes::from(payload)).await
    }

    async fn upload_bytes(&self, key: &ObjectKey, payload: Bytes) -> Result<()> {
        self.put(key, payload).await
    }

    async fn list_keys(&self, prefix: &str) -> Vec<ObjectKey> {
        let prefix = prefix.trim_start_matches('/');

        // The store matches whole segments, so list from the last complete one
        let parent = match prefix.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => {
                match object_store::path::Path::parse(parent) {
                    Ok(parent) => Some(parent),
                    Err(e) => {
                        log::error!("Error listing files in S3: {}", e);
                        return Vec::new();
                    }
                }
            }
            _ => None,
        };

        let listed: object_store::Result<Vec<_>> =
            self.store.list(parent.as_ref()).try_collect().await;

        match listed {
            Ok(metas) => {
                let mut keys: Vec<ObjectKey> = metas
                    .iter()
                    .filter(|meta| meta.location.as_ref().starts_with(prefix))
                    .map(|meta| ObjectKey::from(&meta.location))
                    .collect();
                keys.sort();
                log::info!(
                    "Listed {} files in bucket {} with prefix '{}'",
                    keys.len(),
                    self.bucket,
                    prefix
                );
                keys
            }
            Err(e) => {
                log::error!("Error listing files in S3: {}", e);
                Vec::new()
            }
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        let location = key.to_path()?;
        match self.store.delete(&location).await {
            Ok(()) => {
                log::info!("Deleted {} from bucket {}", key, self.bucket);
                Ok(())
            }
            Err(e) => {
                let err = StoreError::from_store(key, e);
                log::error!("Error deleting file from S3: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn client() -> BucketClient {
        BucketClient::with_store("nutrition-data", Arc::new(InMemory::new()))
    }

    #[tokio::test]
    async fn test_upload_download_delete() -> anyhow::Result<()> {
        let client = client();
        let dir = tempfile::tempdir()?;
        let key = ObjectKey::new("AI/recommender/content_based/results/stats.json");

        assert!(!client.exists(&key).await);
        client
            .upload_bytes(&key, Bytes::from_static(br#"{"n_users": 42}"#))
            .await?;
        assert!(client.exists(&key).await);

        let dest = dir.path().join("stats.json");
        client.download(&key, &dest).await?;
        assert_eq!(std::fs::read(&dest)?, br#"{"n_users": 42}"#);

        client.delete(&key).await?;
        assert!(!client.exists(&key).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() -> anyhow::Result<()> {
        let client = client();
        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("key.parquet");

        let err = client
            .download(&ObjectKey::new("missing/key.parquet"), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!dest.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_replaces_with_or_without_overwrite_flag() -> anyhow::Result<()> {
        let client = client();
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("clusters.csv");
        std::fs::write(&source, "user_id,cluster\n1,0\n")?;
        let key = ObjectKey::new("AI/clustering/clusters.csv");

        client.upload(&source, &key, false).await?;
        std::fs::write(&source, "user_id,cluster\n1,2\n")?;
        client.upload(&source, &key, false).await?;
        assert_eq!(
            client.get_bytes(&key).await?,
            Bytes::from_static(b"user_id,cluster\n1,2\n")
        );

        std::fs::write(&source, "user_id,cluster\n1,3\n")?;
        client.upload(&source, &key, true).await?;
        assert_eq!(
            client.get_bytes(&key).await?,
            Bytes::from_static(b"user_id,cluster\n1,3\n")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_missing_source_is_io_error() {
        let client = client();
        let err = client
            .upload(Path::new("/nonexistent/clusters.csv"), &ObjectKey::new("a/b.csv"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_list_keys_by_prefix() -> anyhow::Result<()> {
        let client = client();
        for key in [
            "AI/clustering/results/user_clusters.xlsx",
            "AI/clustering/results/cluster_analysis.json",
            "AI/anomaly_detection/results/model_statistics.json",
            "transform/folder_6_parquet/daily.parquet",
        ] {
            client
                .upload_bytes(&ObjectKey::new(key), Bytes::from_static(b"x"))
                .await?;
        }

        let keys = client.list_keys("AI/clustering/").await;
        assert_eq!(
            keys,
            vec![
                ObjectKey::new("AI/clustering/results/cluster_analysis.json"),
                ObjectKey::new("AI/clustering/results/user_clusters.xlsx"),
            ]
        );
        assert_eq!(client.list_keys("").await.len(), 4);
        assert!(client.list_keys("reference_data").await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_keys_matches_partial_segments() -> anyhow::Result<()> {
        let client = client();
        for key in [
            "AI/clustering/results/user_clusters.xlsx",
            "AI/anomaly_detection/results/model_statistics.json",
            "transform/folder_6_parquet/daily_percentage_change_duckdb.parquet",
            "transform/folder_6_parquet/user_food_proportion_pandas.parquet",
        ] {
            client
                .upload_bytes(&ObjectKey::new(key), Bytes::from_static(b"x"))
                .await?;
        }

        assert_eq!(
            client.list_keys("AI/clu").await,
            vec![ObjectKey::new("AI/clustering/results/user_clusters.xlsx")]
        );
        assert_eq!(
            client.list_keys("transform/folder_6_parquet/daily").await,
            vec![ObjectKey::new(
                "transform/folder_6_parquet/daily_percentage_change_duckdb.parquet"
            )]
        );
        assert_eq!(client.list_keys("A").await.len(), 2);
        assert!(client.list_keys("AI/x").await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_listed_keys_with_reserved_characters_load_back() -> anyhow::Result<()> {
        let client = client();
        let key = ObjectKey::new("reference_data/aliments#2024.json");
        client
            .upload_bytes(&key, Bytes::from_static(br#"{"rows": 3}"#))
            .await?;

        let listed = client.list_keys("reference_data/").await;
        assert_eq!(listed, vec![key.clone()]);
        assert!(client.exists(&listed[0]).await);
        assert_eq!(
            client.get_bytes(&listed[0]).await?,
            Bytes::from_static(br#"{"rows": 3}"#)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_key_is_invalid_not_missing() {
        let client = client();
        let key = ObjectKey::new("AI//stats.json");
        assert!(!client.exists(&key).await);
        let err = client.get_bytes(&key).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }
}
