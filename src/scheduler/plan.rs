// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::errors::SchedulerError;
use crate::graph::Graph;
use crate::model::Config;
use crate::observability::messages::{graph as msg, StructuredLog};

/// Depth-first collection of every task reachable from `task_names` via
/// `deps_parallel` only. Serial-only deps never enter this set: they're run
/// synchronously on the scheduling thread by `worker::run_serial_chain`, never
/// spawned as their own leveled worker.
fn collect_needed(config: &Config, task_names: &[String]) -> Result<HashSet<String>, SchedulerError> {
    let mut visited = HashSet::new();
    let mut stack: Vec<String> = task_names.to_vec();

    while let Some(name) = stack.pop() {
        if visited.contains(&name) {
            continue;
        }
        let task = config
            .tasks
            .get(&name)
            .ok_or_else(|| SchedulerError::TaskNotFound(name.clone()))?;
        visited.insert(name);

        for dep in &task.deps_parallel {
            if !visited.contains(dep) {
                stack.push(dep.clone());
            }
        }
    }

    Ok(visited)
}

/// Recursively validates that every `deps_serial` entry reachable from `needed`
/// names a real task, without adding any of them to the leveled graph — a
/// serial-only dep must still fail as `TaskNotFound` before any execution, per
/// the same "fail before spawning anything" contract `build_plan` gives parallel
/// deps. A `visited` set guards against re-walking a serial chain shared by
/// multiple needed tasks (or a cycle within `deps_serial` itself, which is the
/// worker's `run_serial_chain` sentinel's job to break at execution time, not this
/// validation pass's).
fn validate_serial_deps(config: &Config, needed: &HashSet<String>) -> Result<(), SchedulerError> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = needed.iter().cloned().collect();

    while let Some(name) = stack.pop() {
        let task = match config.tasks.get(&name) {
            Some(task) => task,
            None => continue, // only `needed` names are guaranteed present; serial deps are checked below
        };

        for dep in &task.deps_serial {
            if visited.contains(dep) {
                continue;
            }
            if !config.tasks.contains_key(dep) {
                return Err(SchedulerError::TaskNotFound(dep.clone()));
            }
            visited.insert(dep.clone());
            stack.push(dep.clone());
        }
    }

    Ok(())
}

/// Builds the needed-task set and its leveled sub-graph. Only `deps_parallel` edges
/// participate in leveling; `deps_serial` chains are validated for existence here
/// but run synchronously by the worker that needs them and never become graph nodes
/// or block a level transition.
pub fn build_plan(config: &Config, task_names: &[String]) -> Result<(HashSet<String>, Vec<Vec<String>>), SchedulerError> {
    let needed = collect_needed(config, task_names)?;
    validate_serial_deps(config, &needed)?;

    let mut graph = Graph::new();
    for name in &needed {
        graph.add_node(name);
        if let Some(task) = config.tasks.get(name) {
            for dep in &task.deps_parallel {
                graph.add_edge(name, dep);
            }
        }
    }

    let levels = graph.execution_levels().map_err(|_| {
        let mut cycle: Vec<String> = graph.cycle_detection().into_iter().collect();
        cycle.sort();
        msg::CycleDetected { cycle: &cycle }.log();
        SchedulerError::CycleDetected(cycle)
    })?;

    msg::LevelsComputed {
        level_count: levels.len(),
        node_count: needed.len(),
    }
    .log();

    Ok((needed, levels))
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
    fn unresolved_parallel_dep_is_task_not_found() {
        let mut child = Task::new("child", "true");
        child.deps_parallel.push("missing".to_string());
        let cfg = config_with(vec![child]);

        let err = build_plan(&cfg, &["child".to_string()]).unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotFound(ref n) if n == "missing"));
    }

    #[test]
    fn unresolved_serial_dep_is_task_not_found_before_execution() {
        let mut child = Task::new("child", "true");
        child.deps_serial.push("missing".to_string());
        let cfg = config_with(vec![child]);

        let err = build_plan(&cfg, &["child".to_string()]).unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotFound(ref n) if n == "missing"));
    }

    #[test]
    fn cycle_among_needed_tasks_is_reported() {
        let mut a = Task::new("a", "true");
        a.deps_parallel.push("b".to_string());
        let mut b = Task::new("b", "true");
        b.deps_parallel.push("a".to_string());
        let cfg = config_with(vec![a, b]);

        let err = build_plan(&cfg, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, SchedulerError::CycleDetected(_)));
    }

    #[test]
    fn serial_only_deps_are_excluded_from_the_leveled_graph() {
        let mut child = Task::new("child", "true");
        child.deps_serial.push("setup".to_string());
        let cfg = config_with(vec![Task::new("setup", "true"), child]);

        let (needed, levels) = build_plan(&cfg, &["child".to_string()]).unwrap();
        // `setup` is a serial-only dep: it must never become its own graph node,
        // or the scheduler would spawn it as an independent worker in addition to
        // `run_serial_chain` running it synchronously.
        assert_eq!(needed, ["child".to_string()].into_iter().collect());
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0], vec!["child".to_string()]);
    }

    #[test]
    fn serial_dep_of_a_transitively_needed_parallel_dep_is_excluded_too() {
        let mut mid = Task::new("mid", "true");
        mid.deps_serial.push("setup".to_string());
        let mut top = Task::new("top", "true");
        top.deps_parallel.push("mid".to_string());
        let cfg = config_with(vec![Task::new("setup", "true"), mid, top]);

        let (needed, _) = build_plan(&cfg, &["top".to_string()]).unwrap();
        let mut names: Vec<String> = needed.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["mid".to_string(), "top".to_string()]);
    }

    #[test]
    fn missing_serial_dep_of_a_serial_dep_is_task_not_found() {
        let mut leaf = Task::new("leaf", "true");
        leaf.deps_serial.push("missing".to_string());
        let mut child = Task::new("child", "true");
        child.deps_serial.push("leaf".to_string());
        let cfg = config_with(vec![leaf, child]);

        let err = build_plan(&cfg, &["child".to_string()]).unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotFound(ref n) if n == "missing"));
    }
}
