// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for child-process lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A child process was spawned via the shell.
pub struct ProcessSpawned<'a> {
    pub command: &'a str,
    pub pid: i32,
}

impl Display for ProcessSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Spawned pid {} for command: {}", self.pid, self.command)
    }
}

impl StructuredLog for ProcessSpawned<'_> {
    fn log(&self) {
        tracing::info!(command = self.command, pid = self.pid, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("process_spawned", span_name = name, command = self.command, pid = self.pid)
    }
}

/// A child process exited successfully (exit code 0, no watcher intervened).
pub struct ProcessExited<'a> {
    pub command: &'a str,
    pub pid: i32,
    pub exit_code: u8,
    pub duration_ms: u64,
}

impl Display for ProcessExited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "pid {} exited {} in {}ms: {}",
            self.pid, self.exit_code, self.duration_ms, self.command
        )
    }
}

impl StructuredLog for ProcessExited<'_> {
    fn log(&self) {
        tracing::info!(
            command = self.command,
            pid = self.pid,
            exit_code = self.exit_code,
            duration_ms = self.duration_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_exited",
            span_name = name,
            command = self.command,
            pid = self.pid,
            exit_code = self.exit_code,
            duration_ms = self.duration_ms,
        )
    }
}

/// A child process failed: nonzero exit, or a watcher terminated it.
pub struct ProcessFailed<'a> {
    pub command: &'a str,
    pub pid: i32,
    pub exit_code: u8,
    pub timed_out: bool,
    pub limit_exceeded: bool,
    pub cancelled: bool,
}

impl Display for ProcessFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let reason = if self.timed_out {
            "timed out"
        } else if self.limit_exceeded {
            "resource limit exceeded"
        } else if self.cancelled {
            "cancelled"
        } else {
            "nonzero exit"
        };
        write!(
            f,
            "pid {} failed ({}), exit_code={}: {}",
            self.pid, reason, self.exit_code, self.command
        )
    }
}

impl StructuredLog for ProcessFailed<'_> {
    fn log(&self) {
        tracing::error!(
            command = self.command,
            pid = self.pid,
            exit_code = self.exit_code,
            timed_out = self.timed_out,
            limit_exceeded = self.limit_exceeded,
            cancelled = self.cancelled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "process_failed",
            span_name = name,
            command = self.command,
            pid = self.pid,
            exit_code = self.exit_code,
            timed_out = self.timed_out,
            limit_exceeded = self.limit_exceeded,
            cancelled = self.cancelled,
        )
    }
}
