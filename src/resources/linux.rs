// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Linux resource enforcement via cgroups v2, and sampling via `/proc`.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::ResourceLimitError;

use super::Usage;

const CGROUP_ROOT: &str = "/sys/fs/cgroup";
const CGROUP_PARENT: &str = "taskgraph-runner";

/// Run-scoped counter handed out to every cgroup leaf, so two tasks limited at the
/// same instant (same runner pid) never collide on one directory.
static NEXT_LEAF_ID: AtomicU64 = AtomicU64::new(0);

/// One delegated cgroup v2 leaf, removed on drop.
pub struct CgroupHandle {
    path: PathBuf,
}

impl CgroupHandle {
    pub fn create(memory_limit_bytes: Option<u64>, cpu_limit_cores: Option<f64>) -> Result<Self, ResourceLimitError> {
        let parent = PathBuf::from(CGROUP_ROOT).join(CGROUP_PARENT);
        fs::create_dir_all(&parent).map_err(|source| ResourceLimitError::CgroupCreateFailed {
            path: parent.display().to_string(),
            source,
        })?;

        let leaf_id = NEXT_LEAF_ID.fetch_add(1, Ordering::Relaxed);
        let leaf = parent.join(format!("task-{}-{}", std::process::id(), leaf_id));
        fs::create_dir_all(&leaf).map_err(|source| ResourceLimitError::CgroupCreateFailed {
            path: leaf.display().to_string(),
            source,
        })?;

        if let Some(bytes) = memory_limit_bytes {
            write_control(&leaf, "memory.max", &bytes.to_string())?;
        }

        if let Some(cores) = cpu_limit_cores {
            let period_us: u64 = 100_000;
            let quota_us = (cores * period_us as f64).round() as u64;
            write_control(&leaf, "cpu.max", &format!("{} {}", quota_us, period_us))?;
        }

        Ok(CgroupHandle { path: leaf })
    }

    pub fn apply(&self, pid: i32) -> Result<(), ResourceLimitError> {
        write_control(&self.path, "cgroup.procs", &pid.to_string())
    }

    pub fn release(&self) {
        let _ = fs::remove_dir(&self.path);
    }
}

fn write_control(dir: &PathBuf, file: &str, value: &str) -> Result<(), ResourceLimitError> {
    let target = dir.join(file);
    fs::write(&target, value).map_err(|source| ResourceLimitError::CgroupWriteFailed {
        file: target.display().to_string(),
        source,
    })
}

/// User-mode clock ticks per second, per `sysconf(_SC_CLK_TCK)`; 100 on all mainstream
/// Linux configurations.
const CLK_TCK: u64 = 100;

pub fn sample_usage(pid: i32) -> Result<Usage, ResourceLimitError> {
    let status_path = format!("/proc/{}/status", pid);
    let status = fs::read_to_string(&status_path).map_err(|source| ResourceLimitError::SamplingFailed { pid, source })?;

    let rss_bytes = status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
        .unwrap_or(0);

    let stat_path = format!("/proc/{}/stat", pid);
    let stat = fs::read_to_string(&stat_path).map_err(|source| ResourceLimitError::SamplingFailed { pid, source })?;

    // Fields after the ")" that closes comm (which may itself contain spaces/parens).
    let after_comm = stat.rsplit_once(')').map(|(_, rest)| rest).unwrap_or(&stat);
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    // utime is field 14 overall, stime is 15; after_comm starts at field 3 (index 0 = state).
    let utime: u64 = fields.get(11).and_then(|v| v.parse().ok()).unwrap_or(0);
    let stime: u64 = fields.get(12).and_then(|v| v.parse().ok()).unwrap_or(0);
    let cpu_time_ns = (utime + stime) * (1_000_000_000 / CLK_TCK);

    Ok(Usage {
        rss_bytes,
        cpu_time_ns,
        cpu_percent: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_usage_reports_own_process() {
        let pid = std::process::id() as i32;
        let usage = sample_usage(pid).expect("should be able to sample self");
        assert!(usage.rss_bytes > 0);
    }

    #[test]
    fn leaf_ids_are_unique_within_a_run() {
        // Two tasks limited concurrently under the same runner pid must land in
        // distinct cgroup directories, never share one.
        let a = NEXT_LEAF_ID.fetch_add(1, Ordering::Relaxed);
        let b = NEXT_LEAF_ID.fetch_add(1, Ordering::Relaxed);
        assert_ne!(a, b);
    }
}
