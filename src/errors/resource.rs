// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Resource-limit errors. Always best-effort: a `ResourceLimitError` degrades
/// enforcement to a no-op and is logged at `warn!`, never propagated to the caller.
#[derive(Error, Debug)]
pub enum ResourceLimitError {
    #[error("failed to create cgroup at {path}: {source}")]
    CgroupCreateFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write cgroup control file {file}: {source}")]
    CgroupWriteFailed {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create job object: {0}")]
    JobObjectCreateFailed(String),

    #[error("failed to assign process to job object: {0}")]
    JobObjectAssignFailed(String),

    #[error("usage sampling unsupported on this platform")]
    SamplingUnsupported,

    #[error("failed to sample usage for pid {pid}: {source}")]
    SamplingFailed {
        pid: i32,
        #[source]
        source: std::io::Error,
    },
}

/// Cache errors. Like `ResourceLimitError`, these are advisory: a cache miss-on-error
/// is indistinguishable from a cache miss to the scheduler, just logged at `warn!`.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to read local cache store at {path}: {source}")]
    LocalReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write local cache marker at {path}: {source}")]
    LocalWriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("remote cache pull failed: {0}")]
    RemotePullFailed(String),

    #[error("remote cache push failed: {0}")]
    RemotePushFailed(String),
}
