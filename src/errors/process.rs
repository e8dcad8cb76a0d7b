// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while preparing or running a single child process.
///
/// These never escape the worker: the scheduler catches them, turns them into a
/// failed `TaskResult`, and keeps going (or sets `failed`, per allow_failure).
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("command string is empty")]
    InvalidCommand,

    #[error("failed to spawn child process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("failed to wait on child process: {0}")]
    WaitFailed(String),

    #[error("failed to assemble child environment: {0}")]
    EnvSetupFailed(String),
}
