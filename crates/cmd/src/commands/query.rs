// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::resolve_format;
use anyhow::{Result, anyhow};
use artifacts::{Format, Loader, ObjectKey};
use log::debug;
use std::io::Write;

/// Run SQL against one parquet or CSV artifact, registered as table `artifact`
pub async fn query_command(
    loader: &Loader,
    key: &str,
    sql: &str,
    format: Option<Format>,
    out: &mut impl Write,
) -> Result<()> {
    debug!("query_command called with key: {key}, sql: {sql}");
    let key = ObjectKey::new(key);
    let format = resolve_format(&key, format)?;

    let loaded = loader
        .query(&key, format, sql)
        .await
        .into_result()
        .map_err(|reason| anyhow!(reason))?;

    if loaded.rows == 0 {
        writeln!(out, "No results found.")?;
        return Ok(());
    }
    writeln!(out, "{}", loaded.value.pretty(None)?)?;
    Ok(())
}
