// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dependency-graph construction and leveling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct CycleDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CycleDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "dependency cycle detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CycleDetected<'_> {
    fn log(&self) {
        tracing::error!(cycle = ?self.cycle, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("cycle_detected", span_name = name, cycle = ?self.cycle)
    }
}

pub struct LevelsComputed {
    pub level_count: usize,
    pub node_count: usize,
}

impl Display for LevelsComputed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "computed {} execution levels for {} nodes", self.level_count, self.node_count)
    }
}

impl StructuredLog for LevelsComputed {
    fn log(&self) {
        tracing::info!(level_count = self.level_count, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "levels_computed",
            span_name = name,
            level_count = self.level_count,
            node_count = self.node_count,
        )
    }
}
