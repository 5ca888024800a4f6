// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::ObjectStoreClient;
use artifacts::catalog::{CatalogEntry, Source};
use std::io::Write;

/// List the dashboard's datasets. With `check`, probe each key in the bucket.
///
/// Returns the number of missing datasets, always zero without `check`.
pub async fn catalog_command(
    client: &dyn ObjectStoreClient,
    source: Option<Source>,
    check: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let mut missing = 0;
    for (entry, key, format) in CatalogEntry::all_keys() {
        if let Some(wanted) = source {
            if entry.has_source_variants() && key != entry.key(wanted) {
                continue;
            }
        }

        let status = if check {
            if client.exists(&key).await {
                "ok"
            } else {
                missing += 1;
                "missing"
            }
        } else {
            "-"
        };
        writeln!(
            out,
            "{:<32} {:<12} {:<8} {}",
            entry.name(),
            format.name(),
            status,
            key
        )?;
    }
    Ok(missing)
}
