// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A minimal blocking counting semaphore, used for both the run-wide job cap and
//! lazily-created per-task concurrency caps. No async runtime is in play anywhere in
//! this crate, so this is plain `Mutex` + `Condvar` rather than a futures-aware type.

use std::sync::{Condvar, Mutex};

pub struct Semaphore {
    state: Mutex<u32>,
    condvar: Condvar,
}

pub struct SemaphorePermit<'a> {
    semaphore: &'a Semaphore,
}

impl Semaphore {
    pub fn new(permits: u32) -> Self {
        Self {
            state: Mutex::new(permits),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then holds it until the returned guard drops.
    pub fn acquire(&self) -> SemaphorePermit<'_> {
        let mut count = self.state.lock().unwrap();
        while *count == 0 {
            count = self.condvar.wait(count).unwrap();
        }
        *count -= 1;
        SemaphorePermit { semaphore: self }
    }

    /// Non-blocking variant used for the early-termination checks: returns `None`
    /// immediately rather than waiting if the run has already failed.
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        let mut count = self.state.lock().unwrap();
        if *count == 0 {
            return None;
        }
        *count -= 1;
        Some(SemaphorePermit { semaphore: self })
    }

    fn release(&self) {
        let mut count = self.state.lock().unwrap();
        *count += 1;
        self.condvar.notify_one();
    }
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn try_acquire_fails_once_exhausted() {
        let sem = Semaphore::new(1);
        let first = sem.try_acquire();
        assert!(first.is_some());
        assert!(sem.try_acquire().is_none());
        drop(first);
        assert!(sem.try_acquire().is_some());
    }

    #[test]
    fn acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(1));
        let permit = sem.acquire();

        let sem2 = sem.clone();
        let handle = thread::spawn(move || {
            let _second = sem2.acquire();
        });

        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!handle.is_finished());

        drop(permit);
        handle.join().unwrap();
    }
}
