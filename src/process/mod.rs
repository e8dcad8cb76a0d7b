// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Child-process subsystem: shell spawn, stdio wiring, timeouts, output streaming,
//! and watcher threads for timeout / resource-limit / interactive control.

mod config;
mod primitives;
mod reader;
mod runner;
mod watchers;

pub use config::{OutputLine, ProcessConfig, ProcessOutcome, StdioPolicy};
pub use primitives::{kill_process, pause_process, resume_process};
pub use runner::run_to_completion;
