// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the scheduler, process, resource-limit, cache, and
//! graph subsystems.
//!
//! Message types follow a struct-based pattern with a `Display` impl so log
//! lines read like prose while [`messages::StructuredLog::log`] still emits
//! machine-readable `tracing` fields alongside them. Messages are organized by
//! subsystem under `messages::{cache, graph, process, resources, scheduler}`.

pub mod messages;
