use tracing::{debug, error};

use super::ThreadPool;
use crate::{Result, RlistError};

/// A thread pool backed by the work stealing pool of the [`Rayon`] library.
///
/// [`Rayon`]: https://docs.rs/rayon/latest/rayon/index.html
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|i| format!("rlist-rayon-{}", i))
            // rayon aborts the process on a panicking job unless a handler is installed
            .panic_handler(|_| error!("a job panicked on the rayon pool"))
            .build()
            .map_err(|e| RlistError::Pool(format!("could not build rayon pool: {}", e)))?;
        debug!("created rayon pool with {} threads", pool.current_num_threads());

        Ok(RayonThreadPool { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}
