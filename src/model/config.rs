// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Task;
use crate::errors::ValidationError;

/// A mapping from task name to `Task`, plus the opaque pieces the cache and
/// toolchain collaborators need. The scheduler never reads an on-disk format;
/// whatever loads one is responsible for producing this value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub tasks: HashMap<String, Task>,

    /// Opaque descriptor consulted only by the cache subsystem.
    #[serde(default)]
    pub remote_cache: Option<RemoteCacheDescriptor>,

    /// Opaque toolchain requirements forwarded verbatim to the toolchain-env collaborator.
    #[serde(default)]
    pub toolchains: Vec<ToolSpec>,
}

/// Opaque to the core beyond being handed to the cache subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCacheDescriptor {
    pub endpoint: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// Opaque to the core beyond being forwarded to `build_toolchain_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub kind: String,
    pub version: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural checks the scheduler relies on before it ever builds a graph:
    /// every declared dependency must name a task that exists. Cycle detection
    /// is the Graph's job, not duplicated here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for task in self.tasks.values() {
            for dep in task.deps_parallel.iter().chain(task.deps_serial.iter()) {
                if !self.tasks.contains_key(dep) {
                    return Err(ValidationError::UnresolvedDependency {
                        task_id: task.name.clone(),
                        missing_dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(tasks: Vec<Task>) -> Config {
        let mut cfg = Config::new();
        for t in tasks {
            cfg.tasks.insert(t.name.clone(), t);
        }
        cfg
    }

    #[test]
    fn validate_accepts_resolved_deps() {
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("base".to_string());
        let cfg = config_with(vec![Task::new("base", "true"), child]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unresolved_parallel_dep() {
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("missing".to_string());
        let cfg = config_with(vec![child]);
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::UnresolvedDependency { .. })
        ));
    }

    #[test]
    fn validate_rejects_unresolved_serial_dep() {
        let mut child = Task::new("child", "true");
        child.deps_serial.push("missing".to_string());
        let cfg = config_with(vec![child]);
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::UnresolvedDependency { .. })
        ));
    }
}
