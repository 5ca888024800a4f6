// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use artifacts::{Artifact, Dataset, Format, Publisher, parse_file};
use std::io::Write;
use std::path::Path;

/// Publish a local `.csv` table or `.json` document as a model result
pub async fn publish_command(
    publisher: &Publisher,
    namespace: &str,
    kind: &str,
    source: &Path,
    name: Option<&str>,
    timestamp: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let format = source
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        .filter(|format| matches!(format, Format::Csv | Format::Json))
        .ok_or_else(|| anyhow!("{} must be a .csv or .json file", source.display()))?;

    let artifact = match parse_file(source, format).await? {
        Dataset::Table(table) => Artifact::table(kind, table),
        Dataset::Json(value) => Artifact::json(kind, value.as_ref().clone()),
    };

    let key = publisher
        .publish(namespace, &artifact, name, timestamp)
        .await?;
    writeln!(out, "{}", key)?;
    Ok(())
}
