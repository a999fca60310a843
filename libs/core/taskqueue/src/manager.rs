// [libs/core/taskqueue/src/manager.rs]
//! Worker pool with a growable target and a one-shot shutdown relation to
//! an upstream pool. The pipeline strings three of these together
//! (verify -> download -> extract): each stage's manager watches the
//! previous stage's "done" flag so it knows to stop once its queue runs dry
//! for good, rather than racing an empty-but-not-yet-final queue.

use crate::queue::BlockingQueue;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

const POLL_TIMEOUT: Duration = Duration::from_millis(250);

struct Inner<T> {
    queue: BlockingQueue<T>,
    target_workers: usize,
    max_workers: AtomicUsize,
    live_workers: AtomicUsize,
    stop_task: AtomicBool,
    done: Arc<AtomicBool>,
    upstream_done: Mutex<Option<Arc<AtomicBool>>>,
    cancel_callback: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    worker_fn: Box<dyn Fn(&WorkerContext<T>) + Send + Sync>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Handed to the worker closure on every loop iteration. Carries the
/// pool's shared state so a worker can pull its next task, requeue on
/// partial progress, decide whether it's time to retire, and — for the
/// download stage's auto-scale heuristic — grow its own pool.
pub struct WorkerContext<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> WorkerContext<T> {
    pub fn next(&self) -> Option<T> {
        self.inner.queue.pop_timeout(POLL_TIMEOUT)
    }

    pub fn requeue(&self, item: T) {
        self.inner.queue.push(item);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stop_task.load(Ordering::SeqCst)
    }

    /// True once the queue is empty and, if a shutdown relation was set,
    /// the upstream pool has also finished feeding it. A worker loop exits
    /// when this is true and `next()` keeps returning `None`.
    pub fn upstream_exhausted(&self) -> bool {
        match self.inner.upstream_done.lock().unwrap().as_ref() {
            Some(upstream) => upstream.load(Ordering::SeqCst),
            None => true,
        }
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Grows the pool by one worker, up to `max_workers`. A worker calls
    /// this on itself when it observes the backlog is skewed toward many
    /// small tasks.
    pub fn increase_worker(&self) -> bool {
        increase_worker(&self.inner)
    }
}

impl<T: Clone> WorkerContext<T> {
    pub fn peek_next_size(&self) -> Option<T> {
        self.inner.queue.peek_front()
    }
}

pub struct TaskManager<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> TaskManager<T> {
    pub fn new(
        target_workers: usize,
        max_workers: usize,
        worker_fn: impl Fn(&WorkerContext<T>) + Send + Sync + 'static,
    ) -> Self {
        let inner = Arc::new(Inner {
            queue: BlockingQueue::new(),
            target_workers: target_workers.max(1),
            max_workers: AtomicUsize::new(max_workers.max(target_workers).max(1)),
            live_workers: AtomicUsize::new(0),
            stop_task: AtomicBool::new(false),
            done: Arc::new(AtomicBool::new(false)),
            upstream_done: Mutex::new(None),
            cancel_callback: Mutex::new(None),
            worker_fn: Box::new(worker_fn),
            handles: Mutex::new(Vec::new()),
        });
        Self { inner }
    }

    pub fn import_tasks(&self, tasks: impl IntoIterator<Item = T>) {
        self.inner.queue.extend(tasks);
    }

    pub fn push_task(&self, task: T) {
        self.inner.queue.push(task);
    }

    /// Spawns `target_workers` and blocks until every one of them retires.
    pub fn run(&self) {
        self.run_without_block();
        self.join();
    }

    /// Spawns `target_workers` and returns immediately; call `join()` later
    /// to wait for the pool to drain. Used by the pipeline so the three
    /// stages can run concurrently instead of one stage fully finishing
    /// before the next starts.
    pub fn run_without_block(&self) {
        for _ in 0..self.inner.target_workers {
            spawn_worker(&self.inner);
        }
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    /// A clone of this manager's completion flag, meant to be handed to a
    /// downstream manager via `set_relation_shut`.
    pub fn done_flag(&self) -> Arc<AtomicBool> {
        self.inner.done.clone()
    }

    pub fn is_done(&self) -> bool {
        self.inner.done.load(Ordering::SeqCst)
    }

    /// Declares that this pool should shut down once its own queue is dry
    /// AND `upstream` has declared itself done. Without a relation, a pool
    /// shuts down purely on its own queue running dry, which is only
    /// correct for a pool nothing else ever feeds.
    pub fn set_relation_shut<U: Send + 'static>(&self, upstream: &TaskManager<U>) {
        *self.inner.upstream_done.lock().unwrap() = Some(upstream.done_flag());
    }

    pub fn set_cancel_callback(&self, callback: impl FnOnce() + Send + 'static) {
        *self.inner.cancel_callback.lock().unwrap() = Some(Box::new(callback));
    }

    pub fn increase_worker(&self) -> bool {
        increase_worker(&self.inner)
    }

    pub fn stop(&self) {
        self.inner.stop_task.store(true, Ordering::SeqCst);
        if let Some(callback) = self.inner.cancel_callback.lock().unwrap().take() {
            callback();
        }
    }

    /// Blocks until every live worker has exited, then marks this pool
    /// done so a downstream relation unblocks.
    pub fn join(&self) {
        let handles = std::mem::take(&mut *self.inner.handles.lock().unwrap());
        for handle in handles {
            let _ = handle.join();
        }
        self.inner.done.store(true, Ordering::SeqCst);
        trace!("worker pool joined");
    }
}

/// Drives the pool's worker closure until the shutdown relation fires or
/// the pool is stopped directly. The closure itself owns pulling from the
/// queue (`context.next()`), so a closure that finds nothing simply
/// returns and the loop re-checks the exit condition.
fn spawn_worker<T: Send + 'static>(inner: &Arc<Inner<T>>) {
    inner.live_workers.fetch_add(1, Ordering::SeqCst);
    let context = WorkerContext { inner: inner.clone() };
    let handle = thread::spawn(move || loop {
        if context.is_stopped() {
            break;
        }
        (context.inner.worker_fn)(&context);
        if context.inner.queue.is_empty() && context.upstream_exhausted() {
            break;
        }
    });
    inner.handles.lock().unwrap().push(handle);
}

fn increase_worker<T: Send + 'static>(inner: &Arc<Inner<T>>) -> bool {
    let max = inner.max_workers.load(Ordering::SeqCst);
    let live = inner.live_workers.load(Ordering::SeqCst);
    if live >= max {
        return false;
    }
    spawn_worker(inner);
    debug!(live = live + 1, max, "grew worker pool");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    #[test]
    fn run_drains_the_queue_and_joins() {
        let processed = Arc::new(StdAtomicUsize::new(0));
        let processed_in_worker = processed.clone();
        let manager: TaskManager<u32> = TaskManager::new(2, 2, move |ctx| {
            if let Some(_item) = ctx.next() {
                processed_in_worker.fetch_add(1, Ordering::SeqCst);
            }
        });
        manager.import_tasks(0..50u32);
        manager.run();
        assert_eq!(processed.load(Ordering::SeqCst), 50);
        assert!(manager.is_done());
    }

    #[test]
    fn stop_halts_workers_before_the_queue_drains() {
        let manager: TaskManager<u32> = TaskManager::new(1, 1, |ctx| {
            ctx.next();
            thread::sleep(Duration::from_millis(5));
        });
        manager.import_tasks(0..10_000u32);
        manager.run_without_block();
        thread::sleep(Duration::from_millis(20));
        manager.stop();
        manager.join();
        assert!(manager.queue_len() > 0);
    }

    #[test]
    fn relation_shut_waits_for_upstream_to_finish() {
        let upstream: TaskManager<u32> = TaskManager::new(1, 1, |ctx| {
            ctx.next();
        });
        let downstream: TaskManager<u32> = TaskManager::new(1, 1, |ctx| {
            ctx.next();
        });
        downstream.set_relation_shut(&upstream);

        upstream.import_tasks(vec![1, 2, 3]);
        downstream.run_without_block();
        // Downstream has no tasks of its own yet and upstream has not
        // declared done, so it should still be alive a moment later.
        thread::sleep(Duration::from_millis(50));
        assert!(!downstream.is_done());

        upstream.run();
        assert!(upstream.is_done());
        downstream.join();
        assert!(downstream.is_done());
    }

    #[test]
    fn increase_worker_is_capped_at_max_workers() {
        let manager: TaskManager<u32> = TaskManager::new(1, 2, |ctx| {
            ctx.next();
        });
        manager.run_without_block();
        assert!(manager.increase_worker());
        assert!(!manager.increase_worker());
        manager.stop();
        manager.join();
    }

    #[test]
    fn a_worker_can_grow_its_own_pool_from_inside_the_closure() {
        let manager: TaskManager<u32> = TaskManager::new(1, 3, |ctx| {
            if let Some(item) = ctx.next() {
                if item == 0 {
                    ctx.increase_worker();
                }
            }
        });
        manager.import_tasks(0..3u32);
        manager.run();
        assert!(manager.is_done());
    }
}
