// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::{ObjectKey, ObjectStoreClient};
use std::io::Write;
use std::path::Path;

/// Download `key` to `dest`. A directory destination keeps the object's name.
pub async fn get_command(
    client: &dyn ObjectStoreClient,
    key: &str,
    dest: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let key = ObjectKey::new(key);
    let dest = if dest.is_dir() {
        dest.join(key.file_name().unwrap_or("object"))
    } else {
        dest.to_path_buf()
    };
    client.download(&key, &dest).await?;
    writeln!(out, "{} -> {}", key, dest.display())?;
    Ok(())
}
