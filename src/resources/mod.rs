// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resource limits: kernel-enforced hard limits where the OS offers them, and a
//! cross-platform usage sampler used by the resource watcher and by monitoring UIs.
//!
//! Two distinct concerns live here: **monitoring** (`sample_usage`, always available,
//! degrading to "unsupported" on unknown platforms) and **enforcement**
//! (`create_hard_limits`/`apply_hard_limits`, which silently no-op wherever the kernel
//! doesn't cooperate — a denied cgroup write is not a runner failure, just a log line).

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

use crate::errors::ResourceLimitError;
use crate::observability::messages::{resources as msg, StructuredLog};

/// A snapshot of a running child's resource consumption.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub rss_bytes: u64,
    pub cpu_time_ns: u64,
    /// Requires delta tracking across samples; always 0 at this layer.
    pub cpu_percent: f64,
}

/// A platform-tagged handle to an exclusive, scoped resource-enforcement mechanism.
/// `None` is both the "unsupported platform" and "no limits requested" case.
pub enum HardLimitHandle {
    #[cfg(target_os = "linux")]
    Linux(linux::CgroupHandle),
    #[cfg(windows)]
    Windows(windows::JobHandle),
    None,
}

impl Drop for HardLimitHandle {
    fn drop(&mut self) {
        match self {
            #[cfg(target_os = "linux")]
            HardLimitHandle::Linux(handle) => handle.release(),
            #[cfg(windows)]
            HardLimitHandle::Windows(handle) => handle.release(),
            HardLimitHandle::None => {}
        }
    }
}

/// Creates (but does not yet apply) a hard-limit handle for the requested caps.
/// Callable before spawn. Degrades to `HardLimitHandle::None` on any platform or
/// permission failure; the resource watcher's soft enforcement remains as a fallback.
pub fn create_hard_limits(memory_limit_bytes: Option<u64>, cpu_limit_cores: Option<f64>) -> HardLimitHandle {
    if memory_limit_bytes.is_none() && cpu_limit_cores.is_none() {
        return HardLimitHandle::None;
    }

    #[cfg(target_os = "linux")]
    {
        match linux::CgroupHandle::create(memory_limit_bytes, cpu_limit_cores) {
            Ok(handle) => return HardLimitHandle::Linux(handle),
            Err(e) => {
                msg::HardLimitCreateFailed { detail: &e.to_string() }.log();
                return HardLimitHandle::None;
            }
        }
    }

    #[cfg(windows)]
    {
        match windows::JobHandle::create(memory_limit_bytes) {
            Ok(handle) => return HardLimitHandle::Windows(handle),
            Err(e) => {
                msg::HardLimitCreateFailed { detail: &e.to_string() }.log();
                return HardLimitHandle::None;
            }
        }
    }

    #[allow(unreachable_code)]
    HardLimitHandle::None
}

/// Assigns the spawned child to the handle's enforcement mechanism. Callable after
/// spawn. Best-effort: failure degrades enforcement to a no-op and is logged, never
/// propagated.
pub fn apply_hard_limits(handle: &HardLimitHandle, pid: i32) {
    match handle {
        #[cfg(target_os = "linux")]
        HardLimitHandle::Linux(h) => {
            if let Err(e) = h.apply(pid) {
                msg::HardLimitApplyFailed { pid, detail: &e.to_string() }.log();
            }
        }
        #[cfg(windows)]
        HardLimitHandle::Windows(h) => {
            if let Err(e) = h.apply(pid) {
                msg::HardLimitApplyFailed { pid, detail: &e.to_string() }.log();
            }
        }
        HardLimitHandle::None => {}
    }
}

/// Samples a process's current resident memory and cumulative CPU time.
pub fn sample_usage(pid: i32) -> Result<Usage, ResourceLimitError> {
    #[cfg(target_os = "linux")]
    {
        return linux::sample_usage(pid);
    }

    #[cfg(target_os = "macos")]
    {
        return macos::sample_usage(pid);
    }

    #[cfg(windows)]
    {
        return windows::sample_usage(pid);
    }

    #[allow(unreachable_code)]
    Err(ResourceLimitError::SamplingUnsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_limits_requested_yields_none_handle() {
        let handle = create_hard_limits(None, None);
        assert!(matches!(handle, HardLimitHandle::None));
    }
}
