// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Content-addressed task cache: fingerprinting, a local marker-file store, and an
//! optional remote pull/push contract.
//!
//! The scheduler treats this subsystem purely as a signal source: a hit (local or
//! promoted from remote) turns a task's execution into a skipped-success `TaskResult`.
//! Nothing here ever blocks a run on its own account — failures degrade to a miss.

mod key;
mod local;
mod remote;

pub use key::compute_key;
pub use local::LocalCacheStore;
pub use remote::RemoteCacheClient;
