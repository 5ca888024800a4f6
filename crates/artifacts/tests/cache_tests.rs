// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::testing::{CountingClient, memory_client, parquet_bytes, sample_table};
use artifacts::{Format, Loader, ObjectKey, ObjectStoreClient, ResultCache, StagingArea};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

struct Fixture {
    cache: ResultCache,
    client: Arc<CountingClient>,
    staging_root: TempDir,
}

impl Fixture {
    async fn new(client: CountingClient, objects: Vec<(&str, Bytes)>) -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let client = Arc::new(client);
        for (key, payload) in objects {
            client
                .inner()
                .upload_bytes(&ObjectKey::new(key), payload)
                .await?;
        }
        let staging_root = tempdir()?;
        let loader = Loader::new(client.clone(), StagingArea::in_dir(staging_root.path()));
        Ok(Self {
            cache: ResultCache::new(loader),
            client,
            staging_root,
        })
    }

    fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_root.path())
            .map(|dir| dir.count())
            .unwrap_or(0)
    }
}

#[tokio::test]
async fn test_second_load_makes_no_store_calls() -> Result<()> {
    let table = sample_table();
    let key = "transform/folder_6_parquet/folder_4_windows_function_filtered/user_food_proportion_pandas.parquet";
    let fx = Fixture::new(
        CountingClient::new(memory_client()),
        vec![(key, parquet_bytes(&table)?)],
    )
    .await?;
    let key = ObjectKey::new(key);

    let first = fx.cache.get_or_load(&key, Format::Parquet).await;
    let calls_after_first = fx.client.total_calls();
    let second = fx.cache.get_or_load(&key, Format::Parquet).await;

    assert_eq!(first.as_table(), Some(&table));
    assert_eq!(first, second);
    assert_eq!(fx.client.downloads(), 1);
    assert_eq!(fx.client.total_calls(), calls_after_first);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_results_are_cached() -> Result<()> {
    let fx = Fixture::new(CountingClient::new(memory_client()), vec![]).await?;
    let key = ObjectKey::new("AI/clustering/results/user_clusters.xlsx");

    let first = fx.cache.get_or_load(&key, Format::Spreadsheet).await;
    let second = fx.cache.get_or_load(&key, Format::Spreadsheet).await;

    assert!(!first.is_loaded());
    assert_eq!(first.reason(), second.reason());
    assert_eq!(fx.client.downloads(), 1);
    Ok(())
}

#[tokio::test]
async fn test_staging_is_empty_after_every_outcome() -> Result<()> {
    let fx = Fixture::new(
        CountingClient::new(memory_client()),
        vec![
            (
                "AI/clustering/results/cluster_analysis.json",
                Bytes::from_static(br#"{"n_clusters": 4}"#),
            ),
            (
                "AI/anomaly_detection/results/model_statistics.json",
                Bytes::from_static(b"{\"general_statistics\": "),
            ),
        ],
    )
    .await?;

    let loaded = fx
        .cache
        .get_or_load(
            &ObjectKey::new("AI/clustering/results/cluster_analysis.json"),
            Format::Json,
        )
        .await;
    assert!(loaded.is_loaded());
    assert_eq!(fx.staged_files(), 0);

    let truncated = fx
        .cache
        .get_or_load(
            &ObjectKey::new("AI/anomaly_detection/results/model_statistics.json"),
            Format::Json,
        )
        .await;
    assert!(truncated.reason().is_some_and(|r| r.contains("parse failed")));
    assert_eq!(fx.staged_files(), 0);

    let missing = fx
        .cache
        .get_or_load(&ObjectKey::new("AI/nothing/here.json"), Format::Json)
        .await;
    assert!(missing.reason().is_some_and(|r| r.contains("download failed")));
    assert_eq!(fx.staged_files(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cold_loads_share_one_download() -> Result<()> {
    let table = sample_table();
    let key = "transform/folder_6_parquet/folder_5_percentage_change_filtered/daily_percentage_change_duckdb.parquet";
    let fx = Fixture::new(
        CountingClient::new(memory_client()).with_download_delay(Duration::from_millis(50)),
        vec![(key, parquet_bytes(&table)?)],
    )
    .await?;
    let key = ObjectKey::new(key);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let cache = fx.cache.clone();
            let key = key.clone();
            tokio::spawn(async move { cache.get_or_load(&key, Format::Parquet).await })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await?);
    }

    assert_eq!(fx.client.downloads(), 1);
    assert_eq!(results.len(), 16);
    assert!(results.iter().all(|r| r == &results[0]));
    assert_eq!(results[0].as_table(), Some(&table));

    let stats = fx.cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 15);
    assert_eq!(fx.staged_files(), 0);
    Ok(())
}

#[tokio::test]
async fn test_model_statistics_scenario() -> Result<()> {
    let key = "AI/anomaly_detection/results/model_statistics.json";
    let fx = Fixture::new(
        CountingClient::new(memory_client()),
        vec![(
            key,
            Bytes::from_static(br#"{"general_statistics": {"anomaly_rate": 4.2}}"#),
        )],
    )
    .await?;
    let key = ObjectKey::new(key);

    let result = fx.cache.get_or_load(&key, Format::Json).await;
    let value = result.as_json().expect("loaded json");
    assert_eq!(value["general_statistics"]["anomaly_rate"], 4.2);
    assert_eq!(result.rows(), Some(1));

    let _again = fx.cache.get_or_load(&key, Format::Json).await;
    assert_eq!(fx.client.downloads(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_parquet_scenario() -> Result<()> {
    let fx = Fixture::new(CountingClient::new(memory_client()), vec![]).await?;

    let result = fx
        .cache
        .get_or_load(&ObjectKey::new("missing/key.parquet"), Format::Parquet)
        .await;

    assert!(!result.is_loaded());
    let reason = result.reason().unwrap_or_default();
    assert!(reason.contains("download failed"), "reason: {reason}");
    assert_eq!(fx.staged_files(), 0);
    Ok(())
}

#[tokio::test]
async fn test_listed_key_with_reserved_characters_loads() -> Result<()> {
    let fx = Fixture::new(
        CountingClient::new(memory_client()),
        vec![(
            "reference_data/aliments#2024.json",
            Bytes::from_static(br#"[{"aliment": "pomme"}, {"aliment": "lentille"}]"#),
        )],
    )
    .await?;

    let listed = fx.client.list_keys("reference_data/ali").await;
    assert_eq!(listed, vec![ObjectKey::new("reference_data/aliments#2024.json")]);

    let result = fx.cache.get_or_load(&listed[0], Format::Json).await;
    assert!(result.is_loaded(), "reason: {:?}", result.reason());
    assert_eq!(result.rows(), Some(2));
    Ok(())
}
