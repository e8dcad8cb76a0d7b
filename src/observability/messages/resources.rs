// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for resource-limit enforcement (cgroups, Job Objects).
//!
//! Both messages here log at `warn!`: a failure to create or apply a hard limit
//! degrades enforcement to the resource watcher's soft kill, it is never fatal.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct HardLimitCreateFailed<'a> {
    pub detail: &'a str,
}

impl Display for HardLimitCreateFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "failed to create hard resource limit: {}", self.detail)
    }
}

impl StructuredLog for HardLimitCreateFailed<'_> {
    fn log(&self) {
        tracing::warn!(detail = self.detail, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("hard_limit_create_failed", span_name = name, detail = self.detail)
    }
}

pub struct HardLimitApplyFailed<'a> {
    pub pid: i32,
    pub detail: &'a str,
}

impl Display for HardLimitApplyFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "failed to apply hard resource limit to pid {}: {}", self.pid, self.detail)
    }
}

impl StructuredLog for HardLimitApplyFailed<'_> {
    fn log(&self) {
        tracing::warn!(pid = self.pid, detail = self.detail, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "hard_limit_apply_failed",
            span_name = name,
            pid = self.pid,
            detail = self.detail,
        )
    }
}
