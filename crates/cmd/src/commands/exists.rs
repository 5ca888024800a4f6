// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::{ObjectKey, ObjectStoreClient};
use std::io::Write;

/// Print whether `key` exists. Returns the answer for the exit status.
pub async fn exists_command(
    client: &dyn ObjectStoreClient,
    key: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let found = client.exists(&ObjectKey::new(key)).await;
    writeln!(out, "{}", found)?;
    Ok(found)
}
