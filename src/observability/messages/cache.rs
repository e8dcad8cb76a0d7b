// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the content-addressed task cache.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct CacheHit<'a> {
    pub task_id: &'a str,
    pub key: &'a str,
}

impl Display for CacheHit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "cache hit for task {} (key {})", self.task_id, self.key)
    }
}

impl StructuredLog for CacheHit<'_> {
    fn log(&self) {
        tracing::info!(task_id = self.task_id, key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("cache_hit", span_name = name, task_id = self.task_id, key = self.key)
    }
}

pub struct CacheMiss<'a> {
    pub task_id: &'a str,
    pub key: &'a str,
}

impl Display for CacheMiss<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "cache miss for task {} (key {})", self.task_id, self.key)
    }
}

impl StructuredLog for CacheMiss<'_> {
    fn log(&self) {
        tracing::info!(task_id = self.task_id, key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("cache_miss", span_name = name, task_id = self.task_id, key = self.key)
    }
}

pub struct RemoteCacheFailed<'a> {
    pub task_id: &'a str,
    pub detail: &'a str,
}

impl Display for RemoteCacheFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "remote cache operation failed for task {}: {}", self.task_id, self.detail)
    }
}

impl StructuredLog for RemoteCacheFailed<'_> {
    fn log(&self) {
        tracing::warn!(task_id = self.task_id, detail = self.detail, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "remote_cache_failed",
            span_name = name,
            task_id = self.task_id,
            detail = self.detail,
        )
    }
}
