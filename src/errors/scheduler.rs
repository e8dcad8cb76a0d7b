// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors returned synchronously by `run` / `plan_dry_run`, before any task is spawned.
///
/// Execution-time failures never reach this type: a failing child process is recorded
/// as a `TaskResult`, not surfaced as a `SchedulerError`.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("task '{0}' is not defined in the config")]
    TaskNotFound(String),

    #[error("dependency cycle detected among tasks: {0:?}")]
    CycleDetected(Vec<String>),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("graph node '{0}' not found")]
    NodeNotFound(String),

    #[error("invalid toolchain spec: {0}")]
    InvalidToolchainSpec(String),

    #[error("unknown toolchain kind: {0}")]
    UnknownToolchainKind(String),

    #[error("invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("config validation failed: {0}")]
    Validation(#[from] super::ValidationError),

    #[error("failed to allocate scheduler state: {0}")]
    AllocationFailed(String),
}
