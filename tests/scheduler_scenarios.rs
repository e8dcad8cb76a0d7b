// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end scenarios against a real shell and real filesystem state, promoted
//! out of `src/` (unlike the colocated unit tests) because these spawn real child
//! processes and touch a real cache directory.

use taskgraph_runner::cache::LocalCacheStore;
use taskgraph_runner::model::{Config, SchedulerConfig, Task};
use taskgraph_runner::scheduler::Scheduler;

fn config_with(tasks: Vec<Task>) -> Config {
    let mut cfg = Config::new();
    for t in tasks {
        cfg.tasks.insert(t.name.clone(), t);
    }
    cfg
}

/// S1 — single task success.
#[test]
fn s1_single_task_success() {
    let scheduler = Scheduler::new();
    let cfg = config_with(vec![Task::new("echo-task", "echo hello")]);

    let mut sched_cfg = SchedulerConfig::default();
    sched_cfg.max_jobs = 1;

    let result = scheduler
        .run(&cfg, &["echo-task".to_string()], &sched_cfg)
        .expect("run should succeed");

    assert!(result.total_success);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].name, "echo-task");
    assert!(result.results[0].success);
    assert_eq!(result.results[0].exit_code, 0);
}

/// S2 — dependency chain: base completes before child is observed.
#[test]
fn s2_dependency_chain_orders_results() {
    let scheduler = Scheduler::new();
    let mut child = Task::new("child", "true");
    child.deps_parallel.push("base".to_string());
    let cfg = config_with(vec![Task::new("base", "true"), child]);

    let result = scheduler
        .run(&cfg, &["child".to_string()], &SchedulerConfig::default())
        .expect("run should succeed");

    assert!(result.total_success);
    assert_eq!(result.results.len(), 2);

    let base_idx = result.results.iter().position(|r| r.name == "base").unwrap();
    let child_idx = result.results.iter().position(|r| r.name == "child").unwrap();
    assert!(base_idx < child_idx, "base must be appended before child");
}

/// S3 — cycle is reported before any execution; no results are produced.
#[test]
fn s3_cycle_is_reported_before_execution() {
    let scheduler = Scheduler::new();
    let mut a = Task::new("a", "true");
    a.deps_parallel.push("b".to_string());
    let mut b = Task::new("b", "true");
    b.deps_parallel.push("a".to_string());
    let cfg = config_with(vec![a, b]);

    let err = scheduler
        .run(&cfg, &["a".to_string()], &SchedulerConfig::default())
        .unwrap_err();

    assert!(matches!(err, taskgraph_runner::errors::SchedulerError::CycleDetected(_)));
}

/// S4 — allow-failure continues: a failing task never flips total_success.
#[test]
fn s4_allow_failure_continues() {
    let scheduler = Scheduler::new();
    let mut fail_ok = Task::new("fail-ok", "exit 1");
    fail_ok.allow_failure = true;
    let cfg = config_with(vec![fail_ok]);

    let result = scheduler
        .run(&cfg, &["fail-ok".to_string()], &SchedulerConfig::default())
        .expect("run should succeed even though the task fails");

    assert!(result.total_success);
    assert_eq!(result.results.len(), 1);
    assert!(!result.results[0].success);
}

/// S5 — timeout kills a slow process well before its own sleep would finish.
#[test]
fn s5_timeout_kills_slow_process() {
    let scheduler = Scheduler::new();
    let mut slow = Task::new("slow", "sleep 5");
    slow.timeout_ms = Some(200);
    let cfg = config_with(vec![slow]);

    let result = scheduler
        .run(&cfg, &["slow".to_string()], &SchedulerConfig::default())
        .expect("run should succeed and report a failed result");

    assert_eq!(result.results.len(), 1);
    assert!(!result.results[0].success);
    assert!(result.results[0].duration_ms < 2000);
}

/// S6 — retry exhaustion still fails, but only the final attempt is reported.
#[test]
fn s6_retry_exhaustion_still_fails() {
    let scheduler = Scheduler::new();
    let mut always_fail = Task::new("always-fail", "exit 1");
    always_fail.retry_max = 2;
    always_fail.retry_delay_ms = 0;
    let cfg = config_with(vec![always_fail]);

    let result = scheduler
        .run(&cfg, &["always-fail".to_string()], &SchedulerConfig::default())
        .expect("run should return, not error");

    assert!(!result.total_success);
    assert_eq!(result.results.len(), 1);
    assert!(!result.results[0].success);
}

/// S7 — a false condition skips the task without running it.
#[test]
fn s7_false_condition_skips() {
    let scheduler = Scheduler::new();
    let mut skip_me = Task::new("skip-me", "exit 1");
    skip_me.condition = Some("false".to_string());
    let cfg = config_with(vec![skip_me]);

    let result = scheduler
        .run(&cfg, &["skip-me".to_string()], &SchedulerConfig::default())
        .expect("run should succeed");

    assert!(result.total_success);
    assert_eq!(result.results.len(), 1);
    assert!(result.results[0].skipped);
    assert!(result.results[0].success);
}

/// S8 — dry run plans a dependency chain without executing anything, and agrees
/// with `plan_dry_run`'s level enumeration.
#[test]
fn s8_dry_run_plans_without_executing() {
    let scheduler = Scheduler::new();
    let mut main = Task::new("main", "exit 1");
    main.deps_parallel.push("dep".to_string());
    let cfg = config_with(vec![Task::new("dep", "exit 1"), main]);

    let mut sched_cfg = SchedulerConfig::default();
    sched_cfg.dry_run = true;

    let result = scheduler
        .run(&cfg, &["main".to_string()], &sched_cfg)
        .expect("dry run should never fail");

    assert!(result.total_success);
    assert_eq!(result.results.len(), 2);
    assert!(result.results.iter().all(|r| r.skipped && r.success));

    let plan = scheduler.plan_dry_run(&cfg, &["main".to_string()]).unwrap();
    let planned_names: std::collections::HashSet<_> = plan.levels.iter().flatten().cloned().collect();
    let executed_names: std::collections::HashSet<_> = result.results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(planned_names, executed_names);
}

/// Cache hit is idempotent: running the same cacheable task twice only spawns once.
#[test]
fn cache_hit_short_circuits_second_run() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = Scheduler::new().with_local_cache(LocalCacheStore::at(dir.path()));

    let mut cached = Task::new("cached", "true");
    cached.cache = true;
    let cfg = config_with(vec![cached]);

    let first = scheduler.run(&cfg, &["cached".to_string()], &SchedulerConfig::default()).unwrap();
    assert!(first.total_success);
    assert!(!first.results[0].skipped);

    let second = scheduler.run(&cfg, &["cached".to_string()], &SchedulerConfig::default()).unwrap();
    assert!(second.total_success);
    assert!(second.results[0].skipped);
}

/// Global-then-per-task semaphore acquisition never deadlocks across a spread of
/// concurrency caps.
#[test]
fn concurrency_caps_do_not_deadlock() {
    for max_jobs in [1u32, 2, 8] {
        for max_concurrent in [0u32, 1, 4] {
            let scheduler = Scheduler::new();
            let mut tasks = Vec::new();
            for i in 0..6 {
                let mut t = Task::new(format!("t{i}"), "true");
                t.max_concurrent = max_concurrent;
                tasks.push(t);
            }
            let names: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
            let cfg = config_with(tasks);

            let mut sched_cfg = SchedulerConfig::default();
            sched_cfg.max_jobs = max_jobs;

            let result = scheduler.run(&cfg, &names, &sched_cfg).unwrap();
            assert!(result.total_success);
            assert_eq!(result.results.len(), 6);
        }
    }
}

/// Serial deps run synchronously, in order, before the dependent task's worker spawns.
#[test]
fn serial_deps_run_before_dependent_worker() {
    let scheduler = Scheduler::new();
    let mut main = Task::new("main", "true");
    main.deps_serial = vec!["setup-a".to_string(), "setup-b".to_string()];
    let cfg = config_with(vec![
        Task::new("setup-a", "true"),
        Task::new("setup-b", "true"),
        main,
    ]);

    let result = scheduler.run(&cfg, &["main".to_string()], &SchedulerConfig::default()).unwrap();
    assert!(result.total_success);

    // Exactly one TaskResult per task: a serial-only dep must never also be
    // spawned as its own leveled worker alongside the synchronous chain running it.
    assert_eq!(result.results.len(), 3);

    let names: Vec<&str> = result.results.iter().map(|r| r.name.as_str()).collect();
    let a = names.iter().position(|&n| n == "setup-a").unwrap();
    let b = names.iter().position(|&n| n == "setup-b").unwrap();
    let main_idx = names.iter().position(|&n| n == "main").unwrap();
    assert!(a < main_idx);
    assert!(b < main_idx);
}

/// A non-allow-failure serial dep failure stops the chain before the dependent
/// task's worker is ever spawned.
#[test]
fn failing_serial_dep_blocks_dependent_task() {
    let scheduler = Scheduler::new();
    let mut main = Task::new("main", "true");
    main.deps_serial = vec!["setup".to_string()];
    let cfg = config_with(vec![Task::new("setup", "exit 1"), main]);

    let result = scheduler.run(&cfg, &["main".to_string()], &SchedulerConfig::default()).unwrap();
    assert!(!result.total_success);

    // Only the serial chain's own single run of `setup` is recorded: it must never
    // also be spawned as an independent leveled worker.
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].name, "setup");
}

/// Environment overrides reach the child process and last-write-wins on collision.
#[test]
fn env_overrides_reach_the_child() {
    let scheduler = Scheduler::new();
    let mut task = Task::new("env-check", "test \"$GREETING\" = \"hello\"");
    task.env = vec![("GREETING".to_string(), "hello".to_string())];
    let cfg = config_with(vec![task]);

    let result = scheduler.run(&cfg, &["env-check".to_string()], &SchedulerConfig::default()).unwrap();
    assert!(result.total_success);
}
