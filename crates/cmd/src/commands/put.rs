// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use artifacts::{ObjectKey, ObjectStoreClient};
use std::io::Write;
use std::path::Path;

pub async fn put_command(
    client: &dyn ObjectStoreClient,
    source: &Path,
    key: &str,
    overwrite: bool,
    out: &mut impl Write,
) -> Result<()> {
    let key = ObjectKey::new(key);
    client.upload(source, &key, overwrite).await?;
    writeln!(out, "{} -> s3://{}/{}", source.display(), client.bucket(), key)?;
    Ok(())
}
