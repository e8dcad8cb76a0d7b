// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::compute_key;
use crate::control::ControlCell;
use crate::model::{Task, TaskResult};
use crate::observability::messages::{cache as cache_msg, scheduler as msg, StructuredLog};
use crate::process::{run_to_completion, ProcessConfig, StdioPolicy};

use super::condition::eval_condition;
use super::RunContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainOutcome {
    Continue,
    Stopped,
}

/// The body of one leveled worker thread: semaphore acquisition, toolchain env,
/// serial-dep chain, conditional skip, cache check, and the retrying process run.
pub(crate) fn worker_body(ctx: &Arc<RunContext>, task: &Task) {
    if ctx.failed.load(Ordering::Acquire) {
        return;
    }

    // Global permit first, always, to avoid the deadlock a reversed order would invite.
    let _global_permit = ctx.global_sem.acquire();
    if ctx.failed.load(Ordering::Acquire) {
        return;
    }

    let task_sem = if task.max_concurrent > 0 {
        Some(ctx.task_semaphore(&task.name, task.max_concurrent))
    } else {
        None
    };
    let _task_permit = task_sem.as_ref().map(|sem| sem.acquire());
    if ctx.failed.load(Ordering::Acquire) {
        return;
    }

    let merged_env = match ctx
        .allocator
        .lock()
        .unwrap()
        .build_toolchain_env(&task.toolchains, &ctx.config.toolchains, &task.env)
    {
        Ok(env) => env,
        Err(e) => {
            *ctx.first_error.lock().unwrap() = Some(e);
            ctx.failed.store(true, Ordering::Release);
            return;
        }
    };

    if run_serial_chain(ctx, &task.deps_serial) == ChainOutcome::Stopped {
        return;
    }

    if let Some(condition) = &task.condition {
        match eval_condition(condition, &merged_env) {
            Ok(false) => {
                msg::TaskSkipped {
                    task_id: &task.name,
                    reason: "condition evaluated to false",
                }
                .log();
                ctx.results.lock().unwrap().push(TaskResult::skipped(&task.name));
                return;
            }
            Ok(true) | Err(_) => {}
        }
    }

    if task.cache {
        let key = compute_key(&task.command, &merged_env);

        if ctx.local_cache.has_hit(&key) {
            cache_msg::CacheHit { task_id: &task.name, key: &key }.log();
            ctx.results.lock().unwrap().push(TaskResult::skipped(&task.name));
            return;
        }

        if let Some(remote) = &ctx.remote_cache {
            match remote.pull(&key) {
                Ok(Some(_bytes)) => {
                    let _ = ctx.local_cache.record_hit(&key);
                    ctx.results.lock().unwrap().push(TaskResult::skipped(&task.name));
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    cache_msg::RemoteCacheFailed {
                        task_id: &task.name,
                        detail: &e.to_string(),
                    }
                    .log();
                }
            }
        }

        cache_msg::CacheMiss { task_id: &task.name, key: &key }.log();
        let result = run_task(ctx, task, &merged_env, Some(key));
        ctx.results.lock().unwrap().push(result);
        return;
    }

    let result = run_task(ctx, task, &merged_env, None);
    ctx.results.lock().unwrap().push(result);
}

/// Runs `task` to completion (with retries), updates `failed`/cache state, and
/// returns the resulting `TaskResult` without recording it — callers own when and
/// where the result lands in the shared results vector.
fn run_task(ctx: &Arc<RunContext>, task: &Task, env: &[(String, String)], cache_key: Option<String>) -> TaskResult {
    let control = control_cell_for(ctx, task);

    let mut attempt = 0u32;
    let mut delay_ms = task.retry_delay_ms;
    let outcome = loop {
        let config = ProcessConfig {
            command: task.command.clone(),
            cwd: task.cwd.as_ref().map(std::path::PathBuf::from),
            env: env.to_vec(),
            stdio: if ctx.scheduler_config.inherit_stdio {
                StdioPolicy::Inherit
            } else {
                StdioPolicy::Capture
            },
            timeout_ms: task.timeout_ms,
            memory_limit_bytes: task.memory_limit_bytes,
            cpu_limit_cores: task.cpu_limit_cores,
            on_output: None,
            control: Some(control.clone()),
            monitor: ctx.scheduler_config.monitor,
        };

        let attempt_result = run_to_completion(&config);
        control.mark_finished();

        let outcome = match attempt_result {
            Ok(outcome) => outcome,
            Err(_) => crate::process::ProcessOutcome {
                exit_code: 1,
                duration_ms: 0,
                success: false,
            },
        };

        if outcome.success || attempt >= task.retry_max {
            break outcome;
        }

        attempt += 1;
        msg::TaskRetrying {
            task_id: &task.name,
            attempt,
            max_attempts: task.retry_max,
            backoff_ms: delay_ms,
        }
        .log();
        std::thread::sleep(Duration::from_millis(delay_ms));
        if task.retry_backoff {
            delay_ms = delay_ms.saturating_mul(2);
        }
    };

    ctx.control_registry.unregister(&task.name);

    let result = TaskResult::ran(&task.name, outcome.success, outcome.exit_code, outcome.duration_ms);

    if result.success {
        if let Some(key) = &cache_key {
            let _ = ctx.local_cache.record_hit(key);
            if let Some(remote) = &ctx.remote_cache {
                if let Err(e) = remote.push(key, &[]) {
                    cache_msg::RemoteCacheFailed {
                        task_id: &task.name,
                        detail: &e.to_string(),
                    }
                    .log();
                }
            }
        }
    } else if !task.allow_failure {
        ctx.failed.store(true, Ordering::Release);
    }

    result
}

fn control_cell_for(ctx: &Arc<RunContext>, task: &Task) -> Arc<ControlCell> {
    if let Some(preregistered) = &ctx.scheduler_config.task_control {
        if preregistered.name() == task.name {
            ctx.control_registry.register(preregistered.clone());
            return preregistered.clone();
        }
    }
    let cell = ControlCell::new(task.name.clone());
    ctx.control_registry.register(cell.clone());
    cell
}

/// Runs `names` synchronously on the calling (worker) thread, recursing into each
/// name's own serial deps first. A name already in `completed` (finished or mid-chain)
/// is never re-triggered; the `None` sentinel marks "currently being chained" and
/// guards against cycles in the serial graph.
pub(crate) fn run_serial_chain(ctx: &Arc<RunContext>, names: &[String]) -> ChainOutcome {
    for name in names {
        {
            let completed = ctx.completed.lock().unwrap();
            match completed.get(name) {
                Some(Some(result)) => {
                    let task = ctx.config.tasks.get(name);
                    let allow_failure = task.map(|t| t.allow_failure).unwrap_or(false);
                    if !result.success && !allow_failure {
                        return ChainOutcome::Stopped;
                    }
                    continue;
                }
                Some(None) => continue, // already being chained elsewhere: cycle guard
                None => {}
            }
        }
        ctx.completed.lock().unwrap().insert(name.clone(), None);

        let task = match ctx.config.tasks.get(name) {
            Some(t) => t.clone(),
            None => return ChainOutcome::Stopped,
        };

        if run_serial_chain(ctx, &task.deps_serial) == ChainOutcome::Stopped {
            return ChainOutcome::Stopped;
        }

        let merged_env = match ctx
            .allocator
            .lock()
            .unwrap()
            .build_toolchain_env(&task.toolchains, &ctx.config.toolchains, &task.env)
        {
            Ok(env) => env,
            Err(e) => {
                *ctx.first_error.lock().unwrap() = Some(e);
                ctx.failed.store(true, Ordering::Release);
                return ChainOutcome::Stopped;
            }
        };

        let cache_key = if task.cache {
            Some(compute_key(&task.command, &merged_env))
        } else {
            None
        };
        let result = run_task(ctx, &task, &merged_env, cache_key);
        let success = result.success;
        ctx.results.lock().unwrap().push(result.clone());
        ctx.completed.lock().unwrap().insert(name.clone(), Some(result));

        if !success && !task.allow_failure {
            return ChainOutcome::Stopped;
        }
    }

    ChainOutcome::Continue
}
