use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::sync::WaitGroup;
use rlist::thread_pool::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use rlist::Result;

fn spawn_counter<P: ThreadPool>(pool: P) -> Result<()> {
    const TASK_NUM: usize = 20;
    const ADD_COUNT: usize = 1000;

    let wg = WaitGroup::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..TASK_NUM {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            for _ in 0..ADD_COUNT {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            drop(wg);
        })
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), TASK_NUM * ADD_COUNT);
    Ok(())
}

fn spawn_panic_task<P: ThreadPool>() -> Result<()> {
    const TASK_NUM: usize = 100;
    const THREAD_NUM: u32 = 4;

    let pool = P::new(THREAD_NUM)?;
    for _ in 0..TASK_NUM {
        pool.spawn(move || {
            // suppresses a flood of panic messages on the console
            panic_control::disable_hook_in_current_thread();
            panic!();
        })
    }

    spawn_counter(pool)
}

#[test]
fn naive_thread_pool_spawn_counter() -> Result<()> {
    spawn_counter(NaiveThreadPool::new(4)?)
}

#[test]
fn shared_queue_thread_pool_spawn_counter() -> Result<()> {
    spawn_counter(SharedQueueThreadPool::new(4)?)
}

#[test]
fn rayon_thread_pool_spawn_counter() -> Result<()> {
    spawn_counter(RayonThreadPool::new(4)?)
}

#[test]
fn shared_queue_thread_pool_panic_task() -> Result<()> {
    spawn_panic_task::<SharedQueueThreadPool>()
}

#[test]
fn rayon_thread_pool_panic_task() -> Result<()> {
    spawn_panic_task::<RayonThreadPool>()
}

#[test]
fn shared_queue_thread_pool_needs_a_thread() {
    assert!(SharedQueueThreadPool::new(0).is_err());
}
