// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ProcessError;
use crate::observability::messages::{process as msg, StructuredLog};
use crate::resources;

use super::config::{ProcessConfig, ProcessOutcome, StdioPolicy};
use super::reader::spawn_line_reader;
use super::watchers::{spawn_control_watcher, spawn_resource_watcher, spawn_timeout_watcher, TerminationFlags};

/// Runs `config.command` to completion via `sh -c`, returning the measured outcome.
///
/// Always invoked through a POSIX shell so redirection and pipes in the command string
/// work as the caller expects. An empty command fails fast with `InvalidCommand` before
/// any spawn is attempted.
pub fn run_to_completion(config: &ProcessConfig) -> Result<ProcessOutcome, ProcessError> {
    if config.command.trim().is_empty() {
        return Err(ProcessError::InvalidCommand);
    }

    let start = Instant::now();

    let hard_limits = resources::create_hard_limits(config.memory_limit_bytes, config.cpu_limit_cores);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&config.command);

    if let Some(cwd) = &config.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &config.env {
        cmd.env(key, value);
    }

    match config.stdio {
        StdioPolicy::Inherit => {
            cmd.stdin(Stdio::inherit());
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        StdioPolicy::Capture => {
            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        }
    }

    let mut child = cmd.spawn().map_err(ProcessError::SpawnFailed)?;
    let pid = child.id() as i32;

    resources::apply_hard_limits(&hard_limits, pid);

    if let Some(control) = &config.control {
        control.set_pid(pid);
    }

    msg::ProcessSpawned {
        command: &config.command,
        pid,
    }
    .log();

    let stdout_reader = child.stdout.take().map(|s| {
        spawn_line_reader(s, false, config.on_output.clone())
    });
    let stderr_reader = child.stderr.take().map(|s| {
        spawn_line_reader(s, true, config.on_output.clone())
    });

    let done = Arc::new(AtomicBool::new(false));
    let flags = Arc::new(TerminationFlags::default());

    let timeout_watcher = config
        .timeout_ms
        .map(|ms| spawn_timeout_watcher(pid, ms, done.clone(), flags.clone()));

    let resource_watcher = if config.memory_limit_bytes.is_some() || config.monitor {
        Some(spawn_resource_watcher(
            pid,
            config.memory_limit_bytes,
            done.clone(),
            flags.clone(),
        ))
    } else {
        None
    };

    let control_watcher = config
        .control
        .clone()
        .map(|control| spawn_control_watcher(pid, control, done.clone(), flags.clone()));

    let wait_result = child.wait();

    done.store(true, Ordering::Release);

    if let Some(h) = stdout_reader {
        let _ = h.join();
    }
    if let Some(h) = stderr_reader {
        let _ = h.join();
    }
    if let Some(h) = timeout_watcher {
        let _ = h.join();
    }
    if let Some(h) = resource_watcher {
        let _ = h.join();
    }
    if let Some(h) = control_watcher {
        let _ = h.join();
    }

    drop(hard_limits);

    let duration_ms = start.elapsed().as_millis() as u64;

    let status = wait_result.map_err(|e| ProcessError::WaitFailed(e.to_string()))?;

    let (exit_code, success) = if flags.any_set() {
        (1u8, false)
    } else {
        let code = status.code().map(|c| c as u8).unwrap_or(1);
        (code, code == 0)
    };

    if success {
        msg::ProcessExited {
            command: &config.command,
            pid,
            exit_code,
            duration_ms,
        }
        .log();
    } else {
        msg::ProcessFailed {
            command: &config.command,
            pid,
            exit_code,
            timed_out: flags.timed_out.load(Ordering::Acquire),
            limit_exceeded: flags.limit_exceeded.load(Ordering::Acquire),
            cancelled: flags.cancelled.load(Ordering::Acquire),
        }
        .log();
    }

    Ok(ProcessOutcome {
        exit_code,
        duration_ms,
        success,
    })
}
