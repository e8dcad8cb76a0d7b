// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::control::ControlCell;

/// How the child's stdio is wired relative to the runner's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioPolicy {
    /// Child inherits parent stdin/stdout/stderr; the user sees output directly.
    Inherit,
    /// Stdin closed, stdout/stderr piped and drained by reader threads.
    Capture,
}

/// One captured line of output, tagged by stream.
#[derive(Debug, Clone)]
pub struct OutputLine {
    pub line: String,
    pub is_stderr: bool,
}

/// Everything the process runner needs to spawn and supervise one shell command.
pub struct ProcessConfig {
    pub command: String,
    pub cwd: Option<std::path::PathBuf>,
    pub env: Vec<(String, String)>,
    pub stdio: StdioPolicy,
    pub timeout_ms: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub cpu_limit_cores: Option<f64>,
    pub on_output: Option<Arc<dyn Fn(OutputLine) + Send + Sync>>,
    pub control: Option<Arc<ControlCell>>,
    pub monitor: bool,
}

impl ProcessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            env: Vec::new(),
            stdio: StdioPolicy::Capture,
            timeout_ms: None,
            memory_limit_bytes: None,
            cpu_limit_cores: None,
            on_output: None,
            control: None,
            monitor: false,
        }
    }
}

/// Outcome of running a command to completion.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    pub exit_code: u8,
    pub duration_ms: u64,
    pub success: bool,
}
