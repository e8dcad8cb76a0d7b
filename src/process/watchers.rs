// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Watcher threads for timeout, resource, and interactive-control enforcement.
//!
//! Each watcher polls its own predicate at its own cadence and exits as soon as the
//! shared `done` flag (set by the main thread once `wait` returns) is observed. The
//! main thread always sets `done` after `wait` and before joining any watcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::control::{ControlCell, Signal};
use crate::resources;

use super::primitives::{kill_process, pause_process, resume_process};

/// Flags a worker's watchers set to request that the outer runner report a failure
/// rather than the child's raw exit code.
#[derive(Default)]
pub struct TerminationFlags {
    pub timed_out: AtomicBool,
    pub limit_exceeded: AtomicBool,
    pub cancelled: AtomicBool,
}

impl TerminationFlags {
    pub fn any_set(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
            || self.limit_exceeded.load(Ordering::Acquire)
            || self.cancelled.load(Ordering::Acquire)
    }
}

const TIMEOUT_SLICE: Duration = Duration::from_millis(50);
const RESOURCE_CADENCE: Duration = Duration::from_millis(100);
const CONTROL_CADENCE: Duration = Duration::from_millis(50);

/// Kills the child once cumulative sleep reaches `timeout_ms`.
pub fn spawn_timeout_watcher(
    pid: i32,
    timeout_ms: u64,
    done: Arc<AtomicBool>,
    flags: Arc<TerminationFlags>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut elapsed = Duration::ZERO;
        let deadline = Duration::from_millis(timeout_ms);
        while !done.load(Ordering::Acquire) {
            std::thread::sleep(TIMEOUT_SLICE);
            elapsed += TIMEOUT_SLICE;
            if elapsed >= deadline {
                flags.timed_out.store(true, Ordering::Release);
                let _ = kill_process(pid);
                break;
            }
        }
    })
}

/// Samples live usage and kills the child if RSS exceeds `memory_limit_bytes`.
/// The CPU-cores field is informational only when hard limits are unavailable.
pub fn spawn_resource_watcher(
    pid: i32,
    memory_limit_bytes: Option<u64>,
    done: Arc<AtomicBool>,
    flags: Arc<TerminationFlags>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !done.load(Ordering::Acquire) {
            std::thread::sleep(RESOURCE_CADENCE);
            if let Some(limit) = memory_limit_bytes {
                if let Ok(usage) = resources::sample_usage(pid) {
                    if usage.rss_bytes > limit {
                        flags.limit_exceeded.store(true, Ordering::Release);
                        let _ = kill_process(pid);
                        break;
                    }
                }
            }
        }
    })
}

/// Acts on cancel/pause/resume signals from the control cell.
pub fn spawn_control_watcher(
    pid: i32,
    control: Arc<ControlCell>,
    done: Arc<AtomicBool>,
    flags: Arc<TerminationFlags>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut paused = false;
        while !done.load(Ordering::Acquire) {
            std::thread::sleep(CONTROL_CADENCE);
            match control.signal() {
                Signal::Cancel => {
                    flags.cancelled.store(true, Ordering::Release);
                    let _ = kill_process(pid);
                    control.clear_signal();
                    break;
                }
                Signal::Pause => {
                    let _ = pause_process(pid);
                    paused = true;
                    control.clear_signal();
                }
                Signal::Resume => {
                    let _ = resume_process(pid);
                    paused = false;
                    control.clear_signal();
                }
                Signal::None => {}
            }
        }
        // Never leave a stopped process behind on normal exit.
        if paused {
            let _ = resume_process(pid);
        }
    })
}
