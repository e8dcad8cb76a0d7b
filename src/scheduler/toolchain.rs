// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resolves declared `ToolSpec` requirements into environment overrides the worker
//! installs into a task's merged env before spawning its command.

use crate::errors::SchedulerError;
use crate::model::ToolSpec;

/// Tracks which toolchain kinds have already been resolved in this run, so a task
/// declaring the same toolchain twice doesn't re-derive (and potentially jitter) its env.
#[derive(Default)]
pub struct ToolchainAllocator {
    resolved: std::collections::HashMap<String, Vec<(String, String)>>,
}

impl ToolchainAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the env overrides for every toolchain a task declares, merged with
    /// `task_env` (task_env wins on key collision, matching last-write-wins semantics
    /// elsewhere in the env pipeline).
    pub fn build_toolchain_env(
        &mut self,
        toolchains: &[String],
        catalog: &[ToolSpec],
        task_env: &[(String, String)],
    ) -> Result<Vec<(String, String)>, SchedulerError> {
        let mut merged: Vec<(String, String)> = Vec::new();

        for requested_kind in toolchains {
            let spec = catalog
                .iter()
                .find(|t| &t.kind == requested_kind)
                .ok_or_else(|| SchedulerError::InvalidToolchainSpec(requested_kind.clone()))?;

            let resolved = self.resolve(spec)?;
            merged.extend(resolved);
        }

        for (key, value) in task_env {
            if let Some(existing) = merged.iter_mut().find(|(k, _)| k == key) {
                existing.1 = value.clone();
            } else {
                merged.push((key.clone(), value.clone()));
            }
        }

        Ok(merged)
    }

    fn resolve(&mut self, spec: &ToolSpec) -> Result<Vec<(String, String)>, SchedulerError> {
        if let Some(cached) = self.resolved.get(&spec.kind) {
            return Ok(cached.clone());
        }

        validate_version(&spec.version)?;

        let env = match spec.kind.as_str() {
            "rust" => vec![
                ("RUSTUP_TOOLCHAIN".to_string(), spec.version.clone()),
            ],
            "node" => vec![
                ("NODE_VERSION".to_string(), spec.version.clone()),
            ],
            "go" => vec![
                ("GOTOOLCHAIN".to_string(), format!("go{}", spec.version)),
            ],
            other => return Err(SchedulerError::UnknownToolchainKind(other.to_string())),
        };

        self.resolved.insert(spec.kind.clone(), env.clone());
        Ok(env)
    }
}

/// Accepts `stable`, `beta`, `nightly`, `lts`, or a dotted numeric version like `1.75`
/// or `1.75.0`. Anything else is rejected before it reaches a toolchain installer.
fn validate_version(version: &str) -> Result<(), SchedulerError> {
    if matches!(version, "stable" | "beta" | "nightly" | "lts") {
        return Ok(());
    }

    let numeric = version
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if numeric && !version.is_empty() {
        Ok(())
    } else {
        Err(SchedulerError::InvalidVersionFormat(version.to_string()))
    }
}
