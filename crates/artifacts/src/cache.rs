// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Session-lifetime result cache
//!
//! Memoizes [`Loader::load`] per `(key, format)`. Failed loads are cached as
//! well, so a missing artifact is not refetched on every interaction. Entries
//! are never evicted or invalidated: artifacts are rebuilt by offline batch
//! jobs between sessions, not during one.
//!
//! Each entry is a `OnceCell`. Concurrent first requests for the same pair
//! wait on a single in-flight load instead of each downloading.

use crate::{Dataset, Format, LoadResult, Loader, ObjectKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type CacheKey = (ObjectKey, Format);

/// Counters for debugging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
}

#[derive(Clone)]
pub struct ResultCache {
    loader: Loader,
    entries: Arc<Mutex<HashMap<CacheKey, Arc<OnceCell<LoadResult<Dataset>>>>>>,
    stats: Arc<Mutex<CacheStats>>,
}

impl ResultCache {
    pub fn new(loader: Loader) -> Self {
        Self {
            loader,
            entries: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Return the stored result for `(key, format)`, loading it on first use
    pub async fn get_or_load(&self, key: &ObjectKey, format: Format) -> LoadResult<Dataset> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry((key.clone(), format))
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        if let Some(result) = cell.get() {
            self.stats.lock().await.hits += 1;
            log::debug!("Cache hit for {} ({})", key, format);
            return result.clone();
        }

        let mut loaded_here = false;
        let result = cell
            .get_or_init(|| async {
                loaded_here = true;
                self.loader.load(key, format).await
            })
            .await
            .clone();

        let mut stats = self.stats.lock().await;
        if loaded_here {
            stats.misses += 1;
            stats.inserts += 1;
        } else {
            stats.hits += 1;
        }
        result
    }

    /// Stored result, if any, without loading
    pub async fn peek(&self, key: &ObjectKey, format: Format) -> Option<LoadResult<Dataset>> {
        let entries = self.entries.lock().await;
        entries
            .get(&(key.clone(), format))
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of completed entries
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        *self.stats.lock().await
    }
}
