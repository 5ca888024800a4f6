// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::resolve_format;
use anyhow::{Result, anyhow};
use artifacts::{Dataset, Format, Loader, ObjectKey};
use std::io::Write;

/// Load an artifact and print it, tables pretty-printed and JSON indented
pub async fn show_command(
    loader: &Loader,
    key: &str,
    format: Option<Format>,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let key = ObjectKey::new(key);
    let format = resolve_format(&key, format)?;

    let loaded = loader
        .load(&key, format)
        .await
        .into_result()
        .map_err(|reason| anyhow!(reason))?;

    writeln!(out, "# {} ({}, {} rows)", loaded.key, loaded.format, loaded.rows)?;
    match &loaded.value {
        Dataset::Table(table) => {
            writeln!(out, "{}", table.pretty(limit)?)?;
            if let Some(n) = limit.filter(|n| *n < table.num_rows()) {
                writeln!(out, "... {} of {} rows shown", n, table.num_rows())?;
            }
        }
        Dataset::Json(value) => {
            writeln!(out, "{}", serde_json::to_string_pretty(value.as_ref())?)?;
        }
    }
    Ok(())
}
