// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::catalog::{CatalogEntry, Source};
use artifacts::testing::{memory_client, parquet_bytes, sample_table};
use artifacts::{ObjectKey, StagingArea};
use bytes::Bytes;
use cmd::commands::*;
use cmd::common::StoreContext;
use std::sync::Arc;
use tempfile::tempdir;

fn context() -> StoreContext {
    StoreContext::with_client(Arc::new(memory_client()), StagingArea::system())
}

async fn seed(ctx: &StoreContext, key: &str, payload: Bytes) -> Result<()> {
    ctx.client().upload_bytes(&ObjectKey::new(key), payload).await?;
    Ok(())
}

fn output(buf: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(buf)?)
}

#[tokio::test]
async fn test_put_ls_get_rm() -> Result<()> {
    let ctx = context();
    let dir = tempdir()?;
    let source = dir.path().join("stats.json");
    std::fs::write(&source, r#"{"n_users": 42}"#)?;

    let mut out = Vec::new();
    put_command(ctx.client(), &source, "AI/recommender/stats.json", false, &mut out).await?;
    std::fs::write(&source, r#"{"n_users": 43}"#)?;
    put_command(ctx.client(), &source, "AI/recommender/stats.json", false, &mut out).await?;

    let mut out = Vec::new();
    list_command(ctx.client(), "AI/", &mut out).await?;
    assert_eq!(output(out)?, "AI/recommender/stats.json\n");

    let fetched = tempdir()?;
    let mut out = Vec::new();
    get_command(ctx.client(), "AI/recommender/stats.json", fetched.path(), &mut out).await?;
    assert_eq!(
        std::fs::read_to_string(fetched.path().join("stats.json"))?,
        r#"{"n_users": 43}"#
    );

    let mut out = Vec::new();
    remove_command(ctx.client(), "AI/recommender/stats.json", &mut out).await?;
    assert!(!exists_command(ctx.client(), "AI/recommender/stats.json", &mut out).await?);
    assert!(output(out)?.ends_with("false\n"));
    Ok(())
}

#[tokio::test]
async fn test_show_json_and_table() -> Result<()> {
    let ctx = context();
    seed(
        &ctx,
        "AI/anomaly_detection/results/model_statistics.json",
        Bytes::from_static(br#"{"general_statistics": {"anomaly_rate": 4.2}}"#),
    )
    .await?;
    seed(&ctx, "transform/sample.parquet", parquet_bytes(&sample_table())?).await?;

    let mut out = Vec::new();
    show_command(
        &ctx.loader(),
        "AI/anomaly_detection/results/model_statistics.json",
        None,
        None,
        &mut out,
    )
    .await?;
    let text = output(out)?;
    assert!(text.starts_with("# AI/anomaly_detection/results/model_statistics.json (json, 1 rows)"));
    assert!(text.contains("\"anomaly_rate\": 4.2"));

    let mut out = Vec::new();
    show_command(&ctx.loader(), "transform/sample.parquet", None, Some(2), &mut out).await?;
    let text = output(out)?;
    assert!(text.contains("legume"));
    assert!(!text.contains("viande"));
    assert!(text.contains("2 of 3 rows shown"));
    Ok(())
}

#[tokio::test]
async fn test_show_missing_reports_reason() {
    let ctx = context();
    let mut out = Vec::new();
    let err = show_command(&ctx.loader(), "missing/key.parquet", None, None, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("download failed"));
}

#[tokio::test]
async fn test_query_parquet() -> Result<()> {
    let ctx = context();
    seed(&ctx, "transform/sample.parquet", parquet_bytes(&sample_table())?).await?;

    let mut out = Vec::new();
    query_command(
        &ctx.loader(),
        "transform/sample.parquet",
        "SELECT type FROM artifact WHERE proportion > 0.2 ORDER BY user_id",
        None,
        &mut out,
    )
    .await?;
    let text = output(out)?;
    assert!(text.contains("fruit"));
    assert!(text.contains("legume"));
    assert!(!text.contains("viande"));
    Ok(())
}

#[tokio::test]
async fn test_publish_csv_file() -> Result<()> {
    let ctx = context();
    let dir = tempdir()?;
    let source = dir.path().join("clusters.csv");
    std::fs::write(&source, "user_id,cluster\n1,0\n2,3\n")?;

    let mut out = Vec::new();
    publish_command(
        &ctx.publisher(),
        "AI",
        "clustering",
        &source,
        None,
        Some("20240315_142501"),
        &mut out,
    )
    .await?;
    assert_eq!(
        output(out)?,
        "AI/clustering/clustering_results_20240315_142501.csv\n"
    );

    let loaded = ctx
        .loader()
        .load(
            &ObjectKey::new("AI/clustering/clustering_results_20240315_142501.csv"),
            artifacts::Format::Csv,
        )
        .await;
    assert_eq!(loaded.rows(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_publish_rejects_other_extensions() -> Result<()> {
    let ctx = context();
    let dir = tempdir()?;
    let source = dir.path().join("clusters.parquet");
    std::fs::write(&source, "x")?;

    let mut out = Vec::new();
    let result = publish_command(&ctx.publisher(), "AI", "clustering", &source, None, None, &mut out).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_catalog_check_counts_missing() -> Result<()> {
    let ctx = context();
    seed(
        &ctx,
        CatalogEntry::ModelStatistics.key(Source::DuckDb).as_str(),
        Bytes::from_static(b"{}"),
    )
    .await?;

    let mut out = Vec::new();
    let missing = catalog_command(ctx.client(), Some(Source::Pandas), true, &mut out).await?;
    let text = output(out)?;

    assert_eq!(text.lines().count(), 11);
    assert_eq!(missing, 10);
    assert!(text.contains("user_food_proportion_pandas.parquet"));
    assert!(!text.contains("_duckdb.parquet"));

    let mut out = Vec::new();
    assert_eq!(catalog_command(ctx.client(), None, false, &mut out).await?, 0);
    assert_eq!(output(out)?.lines().count(), 14);
    Ok(())
}
