// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The execution core of a declarative task runner.
//!
//! Given a [`model::Config`] naming tasks, their commands, environments, and
//! dependencies, this crate decides what to run, orders runs to respect
//! dependencies, executes commands as supervised child processes, memoizes
//! successful runs by content fingerprint, and reports per-task outcomes.
//!
//! Configuration parsing, the command-line/interactive UI, plugin loading, and
//! remote-cache transport are collaborators this crate consumes through plain
//! Rust values and traits ([`model::Config`], [`cache::RemoteCacheClient`]) — none
//! of that lives here.
//!
//! [`scheduler::Scheduler`] is the entry point.

pub mod errors;
pub mod observability;

pub mod cache;
pub mod control;
pub mod graph;
pub mod model;
pub mod process;
pub mod resources;
pub mod scheduler;
