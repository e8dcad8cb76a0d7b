// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging and distributed tracing.
//!
//! Each message type implements:
//!
//! * `Display` - Human-readable output (supports future i18n)
//! * `StructuredLog` - Machine-readable fields + OpenTelemetry span creation
//!
//! Organized by subsystem: `cache`, `graph`, `process`, `resources`, `scheduler`.
//!
//! ## Usage
//! ```rust
//! use taskgraph_runner::observability::messages::{StructuredLog, scheduler::RunStarted};
//!
//! let msg = RunStarted { task_count: 5, level_count: 2 };
//!
//! // Emits both a human-readable message and structured fields.
//! msg.log();
//!
//! // Or create a span with the message's fields as attributes.
//! let span = msg.span("run");
//! let _guard = span.enter();
//! ```

pub mod cache;
pub mod graph;
pub mod process;
pub mod resources;
pub mod scheduler;

use tracing::Span;

/// Trait for messages that support structured logging and distributed tracing.
pub trait StructuredLog {
    /// Emit a log event: a human-readable message (via `Display`) plus
    /// machine-readable fields, at whatever level the message type's
    /// semantic meaning calls for (info/warn/error).
    fn log(&self);

    /// Create a `tracing::Span` with this message's fields as attributes;
    /// the span closes when the returned guard is dropped.
    fn span(&self, name: &str) -> Span;
}
