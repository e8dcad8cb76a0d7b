// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur while validating a `Config` before planning or execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A task references a parallel or serial dependency that doesn't exist.
    UnresolvedDependency {
        task_id: String,
        missing_dependency: String,
    },
    /// A task name appeared more than once while the config was being assembled.
    DuplicateTaskId { task_id: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnresolvedDependency {
                task_id,
                missing_dependency,
            } => write!(
                f,
                "task '{}' depends on '{}' which does not exist",
                task_id, missing_dependency
            ),
            ValidationError::DuplicateTaskId { task_id } => {
                write!(f, "duplicate task id: '{}'", task_id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
