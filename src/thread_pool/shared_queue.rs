use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error};

use super::ThreadPool;
use crate::{Result, RlistError};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool whose workers pull jobs off a shared crossbeam [`channel`].
///
/// The pool itself is the only producer; every worker is a consumer. A worker whose job
/// panics is replaced by a fresh one, so the pool keeps its size. Workers exit once the pool
/// is dropped and the queue has drained.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        if threads == 0 {
            return Err(RlistError::Pool(
                "a shared queue pool needs at least one thread".to_owned(),
            ));
        }
        let (tx, rx) = channel::unbounded::<Job>();
        for id in 0..threads {
            Worker { id, rx: rx.clone() }.start()?;
        }
        debug!("created shared queue pool with {} threads", threads);
        Ok(SharedQueueThreadPool { tx })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // workers only go away when every receiver is gone, and the pool holds none
        if self.tx.send(Box::new(job)).is_err() {
            error!("shared queue pool has no workers left, job dropped");
        }
    }
}

/// One consumer of the job queue. Dropping a `Worker` while its thread is panicking starts
/// a replacement.
struct Worker {
    id: u32,
    rx: Receiver<Job>,
}

impl Worker {
    fn start(self) -> Result<()> {
        thread::Builder::new()
            .name(format!("rlist-worker-{}", self.id))
            .spawn(move || self.run())?;
        Ok(())
    }

    fn run(self) {
        while let Ok(job) = self.rx.recv() {
            job();
        }
        debug!("worker {} exiting, pool was dropped", self.id);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker {} panicked, starting a replacement", self.id);
            let replacement = Worker {
                id: self.id,
                rx: self.rx.clone(),
            };
            if let Err(e) = replacement.start() {
                error!("Failed to respawn worker {}: {}", self.id, e);
            }
        }
    }
}
