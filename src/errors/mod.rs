// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Crate-level error taxonomy.
//!
//! `SchedulerError` is the only error type that escapes `run`/`plan_dry_run`.
//! `ProcessError` and the resource/cache errors stay internal to the worker:
//! they are recorded into a `TaskResult` or logged at `warn!`, never propagated.

mod process;
mod resource;
mod scheduler;
mod validation;

pub use process::ProcessError;
pub use resource::{CacheError, ResourceLimitError};
pub use scheduler::SchedulerError;
pub use validation::ValidationError;
