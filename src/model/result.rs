// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::control::ControlCell;
use std::sync::Arc;

/// The outcome of running (or skipping) a single task.
///
/// Invariant: `skipped ⇒ success ∧ exit_code == 0 ∧ duration_ms == 0`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub name: String,
    pub success: bool,
    pub exit_code: u8,
    pub duration_ms: u64,
    pub skipped: bool,
}

impl TaskResult {
    /// A skipped-success result: used for cache hits, false conditions, and dry-run.
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            exit_code: 0,
            duration_ms: 0,
            skipped: false,
        }
        .into_skipped()
    }

    fn into_skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn ran(name: impl Into<String>, success: bool, exit_code: u8, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            success,
            exit_code,
            duration_ms,
            skipped: false,
        }
    }
}

/// Output of `Scheduler::run`.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    pub results: Vec<TaskResult>,
    /// True iff no recorded result has `success == false` for a task lacking `allow_failure`.
    pub total_success: bool,
}

/// Output of `Scheduler::plan_dry_run`: the ordered levels, without any execution.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunPlan {
    pub levels: Vec<Vec<String>>,
}

/// Runtime knobs for a single `run`/`plan_dry_run` invocation.
#[derive(Clone)]
pub struct SchedulerConfig {
    /// `0` means "number of logical cores".
    pub max_jobs: u32,
    pub inherit_stdio: bool,
    pub dry_run: bool,
    pub monitor: bool,
    pub use_color: bool,
    /// Lets a caller (the interactive UI) pre-register a control cell for the
    /// outermost task; the scheduler also registers one per spawned task on its own.
    pub task_control: Option<Arc<ControlCell>>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_jobs: 0,
            inherit_stdio: false,
            dry_run: false,
            monitor: false,
            use_color: false,
            task_control: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_result_is_inert() {
        let r = TaskResult::skipped("noop");
        assert!(r.skipped);
        assert!(r.success);
        assert_eq!(r.exit_code, 0);
        assert_eq!(r.duration_ms, 0);
    }

    #[test]
    fn ran_result_is_not_skipped() {
        let r = TaskResult::ran("build", false, 1, 250);
        assert!(!r.skipped);
        assert!(!r.success);
        assert_eq!(r.exit_code, 1);
        assert_eq!(r.duration_ms, 250);
    }
}
