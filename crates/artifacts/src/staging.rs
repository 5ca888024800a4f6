// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Scoped local staging
//!
//! Every fetch or publish gets its own temporary directory holding a single
//! file named after the object. The directory is owned by a [`StagingHandle`]
//! and removed when the handle is released or dropped, so early returns and
//! panics clean up the same way as the success path. Two concurrent fetches of
//! the same key never share a path.

use crate::{STAGING_DIR_VAR, StagingError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FALLBACK_NAME: &str = "object";

/// Where staging directories are created
#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    root: Option<PathBuf>,
}

impl StagingArea {
    /// Stage under the system temporary directory
    pub fn system() -> Self {
        Self { root: None }
    }

    /// Stage under `root`, which must exist
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Honors `DASHDATA_STAGING_DIR`, falling back to the system temp dir
    pub fn from_env() -> Self {
        match std::env::var_os(STAGING_DIR_VAR) {
            Some(dir) if !dir.is_empty() => Self::in_dir(dir),
            _ => Self::system(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Reserve a fresh path whose file name is `suggested_name`.
    ///
    /// Only the final path component of the suggestion is used. The file
    /// itself is not created.
    pub fn acquire(&self, suggested_name: &str) -> Result<StagingHandle, StagingError> {
        let name = sanitize(suggested_name);

        let mut builder = tempfile::Builder::new();
        let builder = builder.prefix("dashdata-");
        let dir = match &self.root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| StagingError {
            name: name.clone(),
            source,
        })?;

        let path = dir.path().join(&name);
        log::debug!("Staging {} at {}", name, path.display());
        Ok(StagingHandle {
            dir: Some(dir),
            path,
        })
    }
}

/// Exclusive ownership of one staged file path
#[derive(Debug)]
pub struct StagingHandle {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl StagingHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged file and its directory.
    ///
    /// Already-removed paths are fine. Other failures are logged and
    /// swallowed; cleanup never masks the result of the operation it served.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let dir_path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => log::debug!("Released staging {}", dir_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove staging {}: {}", dir_path.display(), e),
        }
    }
}

impl Drop for StagingHandle {
    fn drop(&mut self) {
        self.remove();
    }
}

fn sanitize(suggested_name: &str) -> String {
    let name = suggested_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}
