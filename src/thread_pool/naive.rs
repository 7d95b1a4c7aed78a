use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tracing::error;

use super::ThreadPool;
use crate::Result;

/// a "thread pool" that is not actually a pool: every spawned job gets a brand new thread.
/// The `threads` argument of [`ThreadPool::new`] is ignored.
pub struct NaiveThreadPool {
    spawned: AtomicU64,
}

impl ThreadPool for NaiveThreadPool {
    fn new(_threads: u32) -> Result<Self> {
        Ok(NaiveThreadPool {
            spawned: AtomicU64::new(0),
        })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.spawned.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = thread::Builder::new()
            .name(format!("rlist-conn-{}", id))
            .spawn(job)
        {
            error!("Failed to spawn a thread: {}", e);
        }
    }
}
