// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Level-by-level OS-thread scheduler: plans a sub-graph over the requested tasks,
//! then executes it level by level with bounded concurrency, retries, caching,
//! conditional skips, and a synchronous serial-dependency chain.

mod condition;
mod plan;
mod semaphore;
mod toolchain;
mod worker;

pub use condition::{eval_condition, ConditionError};
pub use plan::build_plan;
pub use toolchain::ToolchainAllocator;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::cache::{LocalCacheStore, RemoteCacheClient};
use crate::control::ControlRegistry;
use crate::errors::SchedulerError;
use crate::model::{Config, DryRunPlan, ScheduleResult, SchedulerConfig, TaskResult};
use crate::observability::messages::{scheduler as msg, StructuredLog};

use self::semaphore::Semaphore;
use self::worker::worker_body;

/// Shared state for a single `run` invocation, cloned (via `Arc`) into every worker
/// and serial-chain thread.
pub(crate) struct RunContext {
    pub config: Config,
    pub scheduler_config: SchedulerConfig,
    pub local_cache: LocalCacheStore,
    pub remote_cache: Option<Arc<dyn RemoteCacheClient>>,
    pub control_registry: Arc<ControlRegistry>,
    pub allocator: Mutex<ToolchainAllocator>,
    pub results: Mutex<Vec<TaskResult>>,
    pub completed: Mutex<HashMap<String, Option<TaskResult>>>,
    pub failed: AtomicBool,
    pub first_error: Mutex<Option<SchedulerError>>,
    pub global_sem: Semaphore,
    pub task_sems: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl RunContext {
    fn task_semaphore(&self, name: &str, max_concurrent: u32) -> Arc<Semaphore> {
        let mut sems = self.task_sems.lock().unwrap();
        sems.entry(name.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(max_concurrent)))
            .clone()
    }
}

fn num_logical_cores() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// The scheduler entry point. Stateless across calls beyond the cache/remote-cache
/// collaborators it's constructed with; every `run` gets its own `RunContext`.
#[derive(Default)]
pub struct Scheduler {
    local_cache: Option<LocalCacheStore>,
    remote_cache: Option<Arc<dyn RemoteCacheClient>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_cache(mut self, store: LocalCacheStore) -> Self {
        self.local_cache = Some(store);
        self
    }

    pub fn with_remote_cache(mut self, client: Arc<dyn RemoteCacheClient>) -> Self {
        self.remote_cache = Some(client);
        self
    }

    /// Returns the ordered levels for `task_names` without executing anything.
    pub fn plan_dry_run(&self, config: &Config, task_names: &[String]) -> Result<DryRunPlan, SchedulerError> {
        config.validate()?;
        let (_, levels) = build_plan(config, task_names)?;
        Ok(DryRunPlan { levels })
    }

    pub fn run(
        &self,
        config: &Config,
        task_names: &[String],
        scheduler_config: &SchedulerConfig,
    ) -> Result<ScheduleResult, SchedulerError> {
        config.validate()?;
        let (needed, levels) = build_plan(config, task_names)?;

        msg::RunStarted {
            task_count: needed.len(),
            level_count: levels.len(),
        }
        .log();

        let start = Instant::now();

        let global_permits = if scheduler_config.max_jobs == 0 {
            num_logical_cores()
        } else {
            scheduler_config.max_jobs
        };

        let ctx = Arc::new(RunContext {
            config: config.clone(),
            scheduler_config: scheduler_config.clone(),
            local_cache: self.local_cache.clone().unwrap_or_default(),
            remote_cache: self.remote_cache.clone(),
            control_registry: Arc::new(ControlRegistry::new()),
            allocator: Mutex::new(ToolchainAllocator::new()),
            results: Mutex::new(Vec::new()),
            completed: Mutex::new(HashMap::new()),
            failed: AtomicBool::new(false),
            first_error: Mutex::new(None),
            global_sem: Semaphore::new(global_permits.max(1)),
            task_sems: Mutex::new(HashMap::new()),
        });

        if scheduler_config.dry_run {
            let mut results = Vec::new();
            for level in &levels {
                for name in level {
                    results.push(TaskResult::skipped(name));
                }
            }
            let total_success = true;
            msg::RunCompleted {
                succeeded: results.len(),
                failed: 0,
                skipped: results.len(),
                duration_ms: start.elapsed().as_millis() as u64,
            }
            .log();
            return Ok(ScheduleResult { results, total_success });
        }

        for level in &levels {
            if ctx.failed.load(Ordering::Acquire) {
                break;
            }

            let mut handles = Vec::new();
            for name in level {
                if ctx.failed.load(Ordering::Acquire) {
                    break;
                }
                let task = match ctx.config.tasks.get(name) {
                    Some(t) => t.clone(),
                    None => continue,
                };
                let ctx = ctx.clone();
                handles.push(std::thread::spawn(move || worker_body(&ctx, &task)));
            }

            for handle in handles {
                let _ = handle.join();
            }
        }

        if let Some(err) = ctx.first_error.lock().unwrap().take() {
            return Err(err);
        }

        let results = ctx.results.lock().unwrap().clone();
        let total_success = !ctx.failed.load(Ordering::Acquire);

        let succeeded = results.iter().filter(|r| r.success && !r.skipped).count();
        let skipped = results.iter().filter(|r| r.skipped).count();
        let failed_count = results.iter().filter(|r| !r.success).count();

        msg::RunCompleted {
            succeeded,
            failed: failed_count,
            skipped,
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .log();

        if !total_success {
            msg::RunAborted {
                reason: "one or more tasks failed without allow_failure",
            }
            .log();
        }

        Ok(ScheduleResult { results, total_success })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn config_with(tasks: Vec<Task>) -> Config {
        let mut cfg = Config::new();
        for t in tasks {
            cfg.tasks.insert(t.name.clone(), t);
        }
        cfg
    }

    #[test]
    fn unknown_task_name_fails_before_execution() {
        let scheduler = Scheduler::new();
        let cfg = Config::new();
        let err = scheduler
            .run(&cfg, &["ghost".to_string()], &SchedulerConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotFound(_)));
    }

    #[test]
    fn dry_run_reports_all_needed_as_skipped() {
        let scheduler = Scheduler::new();
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("base".to_string());
        let cfg = config_with(vec![Task::new("base", "true"), child]);

        let mut sched_cfg = SchedulerConfig::default();
        sched_cfg.dry_run = true;

        let result = scheduler.run(&cfg, &["child".to_string()], &sched_cfg).unwrap();
        assert_eq!(result.results.len(), 2);
        assert!(result.results.iter().all(|r| r.skipped && r.success));
        assert!(result.total_success);
    }

    #[test]
    fn simple_linear_run_succeeds() {
        let scheduler = Scheduler::new();
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("base".to_string());
        let cfg = config_with(vec![Task::new("base", "true"), child]);

        let result = scheduler.run(&cfg, &["child".to_string()], &SchedulerConfig::default()).unwrap();
        assert!(result.total_success);
        assert_eq!(result.results.len(), 2);
    }

    #[test]
    fn allow_failure_task_does_not_flip_total_success() {
        let scheduler = Scheduler::new();
        let mut flaky = Task::new("flaky", "exit 1");
        flaky.allow_failure = true;
        let cfg = config_with(vec![flaky]);

        let result = scheduler.run(&cfg, &["flaky".to_string()], &SchedulerConfig::default()).unwrap();
        assert!(result.total_success);
        assert!(!result.results[0].success);
    }

    #[test]
    fn non_allow_failure_task_flips_total_success() {
        let scheduler = Scheduler::new();
        let cfg = config_with(vec![Task::new("broken", "exit 1")]);

        let result = scheduler.run(&cfg, &["broken".to_string()], &SchedulerConfig::default()).unwrap();
        assert!(!result.total_success);
    }

    #[test]
    fn plan_dry_run_does_not_execute_anything() {
        let scheduler = Scheduler::new();
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("base".to_string());
        let cfg = config_with(vec![Task::new("base", "true"), child]);

        let plan = scheduler.plan_dry_run(&cfg, &["child".to_string()]).unwrap();
        assert_eq!(plan.levels.len(), 2);
        assert_eq!(plan.levels[0], vec!["base".to_string()]);
    }
}
