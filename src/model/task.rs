// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// A named, shell-executable unit of work with dependency, retry, and resource metadata.
///
/// `Task` is immutable once a `Config` has been built; the scheduler only ever reads it.
/// Every optional/flag field carries `#[serde(default)]` so a collaborator's partial
/// document still deserializes into a usable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique name; the key this task is addressed by everywhere in the core.
    pub name: String,

    /// Command string interpreted by a POSIX shell (`sh -c <command>`).
    pub command: String,

    /// Working directory for the child process. `None` inherits the scheduler's cwd.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Environment overrides applied on top of the inherited process environment,
    /// last write wins, in the order given here.
    #[serde(default)]
    pub env: Vec<(String, String)>,

    /// Names of tasks this task depends on; they participate in leveled, parallel execution.
    #[serde(default)]
    pub deps_parallel: Vec<String>,

    /// Names of tasks run synchronously on the scheduling thread immediately before this
    /// task's worker is spawned.
    #[serde(default)]
    pub deps_serial: Vec<String>,

    /// Boolean expression evaluated against this task's env by an external condition
    /// evaluator; a `false` result skips the task without running it.
    #[serde(default)]
    pub condition: Option<String>,

    /// Wall-clock timeout in milliseconds. `None` means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Hard memory limit in bytes, enforced via cgroups v2 / job objects where available.
    #[serde(default)]
    pub memory_limit_bytes: Option<u64>,

    /// Hard CPU limit expressed in whole or fractional cores.
    #[serde(default)]
    pub cpu_limit_cores: Option<f64>,

    /// Whether successful runs of this task should be memoized by content fingerprint.
    #[serde(default)]
    pub cache: bool,

    /// Maximum number of retries after an initial failed attempt.
    #[serde(default)]
    pub retry_max: u32,

    /// Initial delay between a failed attempt and its retry, in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Whether the retry delay doubles after each failed attempt.
    #[serde(default)]
    pub retry_backoff: bool,

    /// If set, a failure of this task never flips the aggregate `total_success` to false.
    #[serde(default)]
    pub allow_failure: bool,

    /// Maximum concurrent executions of this specific task across the whole run.
    /// `0` means unlimited.
    #[serde(default)]
    pub max_concurrent: u32,

    /// Opaque toolchain requirements forwarded to the toolchain-env collaborator.
    #[serde(default)]
    pub toolchains: Vec<String>,
}

impl Task {
    /// Construct a minimal task with only a name and command; every other field
    /// takes its zero/default value.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            cwd: None,
            env: Vec::new(),
            deps_parallel: Vec::new(),
            deps_serial: Vec::new(),
            condition: None,
            timeout_ms: None,
            memory_limit_bytes: None,
            cpu_limit_cores: None,
            cache: false,
            retry_max: 0,
            retry_delay_ms: 0,
            retry_backoff: false,
            allow_failure: false,
            max_concurrent: 0,
            toolchains: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_has_zero_defaults() {
        let t = Task::new("build", "cargo build");
        assert_eq!(t.retry_max, 0);
        assert!(!t.cache);
        assert!(!t.allow_failure);
        assert_eq!(t.max_concurrent, 0);
        assert!(t.deps_parallel.is_empty());
        assert!(t.deps_serial.is_empty());
    }

    #[test]
    fn partial_document_deserializes_with_defaults() {
        let json = r#"{"name":"build","command":"cargo build"}"#;
        let t: Task = serde_json::from_str(json).expect("partial task should deserialize");
        assert_eq!(t.name, "build");
        assert_eq!(t.retry_max, 0);
        assert!(t.env.is_empty());
    }
}
