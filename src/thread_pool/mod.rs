//! Thread pools that run a [`ListServer`]'s connection handlers.
//!
//! A handler occupies its thread for as long as the client stays connected, so a pool with a
//! fixed number of threads also caps the number of clients that can be served at once.
//! [`NaiveThreadPool`] has no such cap: every connection gets a thread of its own.
//!
//! [`ListServer`]: ../struct.ListServer.html
use crate::Result;

/// A pool of threads that jobs can be handed to
pub trait ThreadPool {
    /// creates a new thread pool with (at most) `threads` threads
    ///
    /// # Errors
    /// returns an error if a thread or the pool itself could not be created
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// runs `job` on one of the pool's threads. Does not wait for the job to finish.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

mod naive;
mod rayon_pool;
mod shared_queue;

pub use self::naive::NaiveThreadPool;
pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
