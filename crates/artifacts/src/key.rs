// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use object_store::path::Path;
use std::fmt;
use std::sync::Arc;

/// Slash-delimited name of an object in the bucket.
///
/// Keys are immutable; clones share the same allocation so they are cheap to
/// use as cache keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(Arc<str>);

impl ObjectKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, or `None` when the key ends in `/` or is empty
    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Extension of the last segment, lowercased, without the dot
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Append a segment, inserting exactly one `/` between them
    pub fn join(&self, segment: &str) -> Self {
        let base = self.0.trim_end_matches('/');
        let segment = segment.trim_start_matches('/');
        if base.is_empty() {
            Self::new(segment)
        } else {
            Self::new(format!("{base}/{segment}"))
        }
    }

    /// Store location with the key's characters taken verbatim.
    ///
    /// Keys with empty segments, `.` or `..` segments, or control characters
    /// have no location and fail with [`StoreError::InvalidKey`].
    pub(crate) fn to_path(&self) -> Result<Path, StoreError> {
        Path::parse(self.as_str()).map_err(|source| StoreError::InvalidKey {
            key: self.clone(),
            source,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:?})", &*self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ObjectKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl From<&Path> for ObjectKey {
    fn from(path: &Path) -> Self {
        Self::new(path.as_ref())
    }
}
