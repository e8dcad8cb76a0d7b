// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::errors::CacheError;
use crate::observability::messages::{cache as msg, StructuredLog};

/// A per-user directory of empty marker files, one per cache-hit key.
///
/// Markers are written atomically (write to a temp name, then rename) so a crash
/// mid-write never leaves a key that looks hit but isn't.
#[derive(Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
}

impl LocalCacheStore {
    /// Resolves the default per-user cache directory (`dirs::cache_dir()/taskgraph-runner`),
    /// falling back to a relative `.taskgraph-cache` if the platform has no such directory.
    pub fn default_location() -> Self {
        let root = dirs::cache_dir()
            .map(|d| d.join("taskgraph-runner"))
            .unwrap_or_else(|| PathBuf::from(".taskgraph-cache"));
        Self { root }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn marker_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.ok", key))
    }

    pub fn has_hit(&self, key: &str) -> bool {
        self.marker_path(key).is_file()
    }

    pub fn record_hit(&self, key: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root).map_err(|source| CacheError::LocalWriteFailed {
            path: self.root.display().to_string(),
            source,
        })?;

        let target = self.marker_path(key);
        let tmp = self.root.join(format!("{}.tmp-{}", key, std::process::id()));
        fs::write(&tmp, []).map_err(|source| CacheError::LocalWriteFailed {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &target).map_err(|source| CacheError::LocalWriteFailed {
            path: target.display().to_string(),
            source,
        })?;

        msg::CacheHit { task_id: key, key }.log();
        Ok(())
    }

    /// Removes markers whose mtime is older than `now - max_age`. Advisory: callers
    /// never wait on this, and an error here is a missed sweep, not a failed run.
    pub fn evict_older_than(&self, max_age: Duration) -> Result<usize, CacheError> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if let Ok(meta) = entry.metadata() {
                if let Ok(modified) = meta.modified() {
                    if modified < cutoff {
                        if fs::remove_file(&path).is_ok() {
                            removed += 1;
                        }
                    }
                }
            }
        }
        Ok(removed)
    }
}

impl Default for LocalCacheStore {
    fn default() -> Self {
        Self::default_location()
    }
}
