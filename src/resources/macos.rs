// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! macOS usage sampling. No `mach-sys`-style crate is part of this project's
//! dependency stack, so usage is read the same way `Activity Monitor`'s command-line
//! cousin does: via `ps`, which is always present on a macOS host.
//!
//! Hard-limit enforcement has no macOS counterpart here; `create_hard_limits` always
//! yields `HardLimitHandle::None` on this platform, leaving the resource watcher's
//! soft kill as the only enforcement path.

use std::process::Command;

use crate::errors::ResourceLimitError;

use super::Usage;

pub fn sample_usage(pid: i32) -> Result<Usage, ResourceLimitError> {
    let output = Command::new("ps")
        .args(["-o", "rss=,time=", "-p", &pid.to_string()])
        .output()
        .map_err(|source| ResourceLimitError::SamplingFailed { pid, source })?;

    if !output.status.success() {
        return Err(ResourceLimitError::SamplingFailed {
            pid,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "ps reported no such process"),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let mut parts = text.split_whitespace();

    let rss_kb: u64 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0);
    let cpu_time_ns = parts.next().map(parse_ps_time).unwrap_or(0);

    Ok(Usage {
        rss_bytes: rss_kb * 1024,
        cpu_time_ns,
        cpu_percent: 0.0,
    })
}

/// Parses `ps`'s `[[dd-]hh:]mm:ss[.ff]` cumulative CPU time format into nanoseconds.
fn parse_ps_time(raw: &str) -> u64 {
    let (days, rest) = match raw.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().unwrap_or(0), rest),
        None => (0, raw),
    };

    let fields: Vec<&str> = rest.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (h.parse().unwrap_or(0), m.parse().unwrap_or(0), s.parse::<f64>().unwrap_or(0.0)),
        [m, s] => (0u64, m.parse().unwrap_or(0), s.parse::<f64>().unwrap_or(0.0)),
        _ => (0, 0, 0.0),
    };

    let total_seconds = days as f64 * 86_400.0 + hours as f64 * 3_600.0 + minutes as f64 * 60.0 + seconds;
    (total_seconds * 1_000_000_000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes_seconds() {
        assert_eq!(parse_ps_time("01:30"), 90_000_000_000);
    }

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_ps_time("01:02:03"), (3723) * 1_000_000_000);
    }
}
