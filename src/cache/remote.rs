// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::CacheError;

/// A remote cache backend: the scheduler uses this only as a signal source. A
/// non-null `pull` result is a remote hit and is promoted to a local hit for
/// subsequent runs; `push` is best-effort on success and never blocks a run.
pub trait RemoteCacheClient: Send + Sync {
    fn pull(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn push(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
}
