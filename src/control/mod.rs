// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Interactive control: per-task cancel/pause/resume signalling, discoverable by name.
//!
//! A `ControlCell` is shared (via `Arc`) between the scheduler, the worker's watcher
//! threads, and whatever UI collaborator wants to steer a running task. All fields use
//! atomics with release/acquire ordering so no additional locking is needed to read or
//! write them; the `ControlRegistry` mutex protects only the name -> cell map itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// The signal a control watcher should act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Signal {
    None = 0,
    Cancel = 1,
    Pause = 2,
    Resume = 3,
}

impl Signal {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Signal::Cancel,
            2 => Signal::Pause,
            3 => Signal::Resume,
            _ => Signal::None,
        }
    }
}

/// A thread-safe record of a running task's signal/pid/finished state.
///
/// All fields are read/written with atomic release/acquire ordering so watcher threads,
/// the scheduling thread, and an interactive UI can all touch a cell concurrently without
/// a per-cell lock.
pub struct ControlCell {
    name: String,
    signal: AtomicU8,
    pid: AtomicI32,
    finished: AtomicBool,
}

impl ControlCell {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            signal: AtomicU8::new(Signal::None as u8),
            pid: AtomicI32::new(0),
            finished: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_pid(&self, pid: i32) {
        self.pid.store(pid, Ordering::Release);
    }

    pub fn pid(&self) -> i32 {
        self.pid.load(Ordering::Acquire)
    }

    pub fn signal(&self) -> Signal {
        Signal::from_u8(self.signal.load(Ordering::Acquire))
    }

    pub fn set_signal(&self, signal: Signal) {
        self.signal.store(signal as u8, Ordering::Release);
    }

    /// Clears the signal back to `None`, typically after a watcher has acted on it.
    pub fn clear_signal(&self) {
        self.set_signal(Signal::None);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Marked by the worker on exit, before the cell's watchers are joined.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// A mutex-guarded mapping from task name to `ControlCell`.
///
/// A finished entry is treated as "not present" by `find`/`active_names`, but it
/// remains addressable (e.g. for `unregister`) until the caller removes it.
#[derive(Default)]
pub struct ControlRegistry {
    cells: Mutex<HashMap<String, Arc<ControlCell>>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, cell: Arc<ControlCell>) {
        let mut cells = self.cells.lock().unwrap();
        cells.insert(cell.name().to_string(), cell);
    }

    pub fn unregister(&self, name: &str) {
        let mut cells = self.cells.lock().unwrap();
        cells.remove(name);
    }

    /// Returns the cell if present and not finished; `None` otherwise.
    pub fn find(&self, name: &str) -> Option<Arc<ControlCell>> {
        let cells = self.cells.lock().unwrap();
        cells
            .get(name)
            .filter(|cell| !cell.is_finished())
            .cloned()
    }

    /// Snapshot of names whose cells are not finished.
    pub fn active_names(&self) -> Vec<String> {
        let cells = self.cells.lock().unwrap();
        cells
            .values()
            .filter(|cell| !cell.is_finished())
            .map(|cell| cell.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_none_for_unknown_name() {
        let registry = ControlRegistry::new();
        assert!(registry.find("ghost").is_none());
    }

    #[test]
    fn registered_cell_is_findable_until_finished() {
        let registry = ControlRegistry::new();
        let cell = ControlCell::new("build");
        registry.register(cell.clone());

        assert!(registry.find("build").is_some());
        assert_eq!(registry.active_names(), vec!["build".to_string()]);

        cell.mark_finished();
        assert!(registry.find("build").is_none());
        assert!(registry.active_names().is_empty());
    }

    #[test]
    fn finished_cell_remains_addressable_until_unregistered() {
        let registry = ControlRegistry::new();
        let cell = ControlCell::new("build");
        registry.register(cell.clone());
        cell.mark_finished();

        // Not discoverable via find/active_names, but unregister still works.
        assert!(registry.find("build").is_none());
        registry.unregister("build");
        assert!(registry.find("build").is_none());
    }

    #[test]
    fn signal_round_trips() {
        let cell = ControlCell::new("task");
        assert_eq!(cell.signal(), Signal::None);
        cell.set_signal(Signal::Cancel);
        assert_eq!(cell.signal(), Signal::Cancel);
        cell.clear_signal();
        assert_eq!(cell.signal(), Signal::None);
    }
}
