// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A small boolean-expression grammar for task `condition` fields, evaluated against
//! a task's env overrides. Per the propagation policy, a malformed expression is
//! treated as "run the task" — the caller sees this as `Ok(true)`, not an error.
//!
//! Grammar: `KEY`, `!KEY` (negation; true iff KEY is absent or empty), `KEY==VALUE`,
//! `KEY!=VALUE`. No boolean connectives; a task needing AND/OR composes multiple
//! conditions upstream of this crate.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionError(pub String);

pub fn eval_condition(expr: &str, env: &[(String, String)]) -> Result<bool, ConditionError> {
    let expr = expr.trim();

    if expr.is_empty() {
        return Err(ConditionError("empty condition expression".to_string()));
    }

    if let Some(rest) = expr.strip_prefix('!') {
        return eval_condition(rest, env).map(|v| !v);
    }

    if let Some((key, value)) = expr.split_once("==") {
        return Ok(lookup(env, key.trim()).map(|v| v == value.trim()).unwrap_or(false));
    }

    if let Some((key, value)) = expr.split_once("!=") {
        return Ok(lookup(env, key.trim()).map(|v| v != value.trim()).unwrap_or(true));
    }

    if !expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConditionError(format!("unrecognized condition expression: {}", expr)));
    }

    Ok(lookup(env, expr).map(|v| !v.is_empty()).unwrap_or(false))
}

fn lookup<'a>(env: &'a [(String, String)], key: &str) -> Option<&'a str> {
    env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}
