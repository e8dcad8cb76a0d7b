// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduler lifecycle: run start/completion, task dispatch, retries.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct RunStarted {
    pub task_count: usize,
    pub level_count: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "starting run: {} tasks across {} levels", self.task_count, self.level_count)
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(task_count = self.task_count, level_count = self.level_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_started",
            span_name = name,
            task_count = self.task_count,
            level_count = self.level_count,
        )
    }
}

pub struct RunCompleted {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "run completed in {}ms: {} succeeded, {} failed, {} skipped",
            self.duration_ms, self.succeeded, self.failed, self.skipped
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            duration_ms = self.duration_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            duration_ms = self.duration_ms,
        )
    }
}

pub struct TaskRetrying<'a> {
    pub task_id: &'a str,
    pub attempt: u32,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Display for TaskRetrying<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "retrying task {} (attempt {}/{}) after {}ms backoff",
            self.task_id, self.attempt, self.max_attempts, self.backoff_ms
        )
    }
}

impl StructuredLog for TaskRetrying<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            attempt = self.attempt,
            max_attempts = self.max_attempts,
            backoff_ms = self.backoff_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "task_retrying",
            span_name = name,
            task_id = self.task_id,
            attempt = self.attempt,
            max_attempts = self.max_attempts,
        )
    }
}

pub struct TaskSkipped<'a> {
    pub task_id: &'a str,
    pub reason: &'a str,
}

impl Display for TaskSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "skipping task {}: {}", self.task_id, self.reason)
    }
}

impl StructuredLog for TaskSkipped<'_> {
    fn log(&self) {
        tracing::info!(task_id = self.task_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("task_skipped", span_name = name, task_id = self.task_id, reason = self.reason)
    }
}

pub struct RunAborted<'a> {
    pub reason: &'a str,
}

impl Display for RunAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "run aborted: {}", self.reason)
    }
}

impl StructuredLog for RunAborted<'_> {
    fn log(&self) {
        tracing::error!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("run_aborted", span_name = name, reason = self.reason)
    }
}
