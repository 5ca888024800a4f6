// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::ObjectStoreClient;
use std::io::Write;

pub async fn list_command(
    client: &dyn ObjectStoreClient,
    prefix: &str,
    out: &mut impl Write,
) -> Result<()> {
    for key in client.list_keys(prefix).await {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}
