// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::{ObjectKey, ObjectStoreClient};
use std::io::Write;

pub async fn remove_command(
    client: &dyn ObjectStoreClient,
    key: &str,
    out: &mut impl Write,
) -> Result<()> {
    let key = ObjectKey::new(key);
    client.delete(&key).await?;
    writeln!(out, "deleted {}", key)?;
    Ok(())
}
