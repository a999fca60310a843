// [libs/core/taskqueue/src/queue.rs]
//! A `Mutex<VecDeque<T>> + Condvar` queue. `std::sync::mpsc` cannot support
//! this: the download stage's auto-scale heuristic needs to peek the size
//! of the head-of-queue entry without consuming it, which an mpsc channel
//! has no way to express.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

pub struct BlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        Self { items: Mutex::new(VecDeque::new()), not_empty: Condvar::new() }
    }

    pub fn push(&self, item: T) {
        let mut guard = self.items.lock().unwrap();
        guard.push_back(item);
        self.not_empty.notify_one();
    }

    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let mut guard = self.items.lock().unwrap();
        let before = guard.len();
        guard.extend(items);
        if guard.len() > before {
            self.not_empty.notify_all();
        }
    }

    /// Blocks up to `timeout` for an item. Returns `None` on timeout, never
    /// on a merely-momentarily-empty queue — callers loop on this rather
    /// than treating `None` as definitive emptiness.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut guard = self.items.lock().unwrap();
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = guard.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (next_guard, timeout_result) = self.not_empty.wait_timeout(guard, deadline - now).unwrap();
            guard = next_guard;
            if timeout_result.timed_out() && guard.is_empty() {
                return None;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

impl<T: Clone> BlockingQueue<T> {
    /// Clones the head of the queue without removing it. Used by the
    /// download stage's dynamic-scaling heuristic, which needs the size of
    /// the next task before deciding whether to grow the pool.
    pub fn peek_front(&self) -> Option<T> {
        self.items.lock().unwrap().front().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn pop_timeout_returns_none_on_empty_queue() {
        let queue: BlockingQueue<u32> = BlockingQueue::new();
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue: BlockingQueue<u32> = BlockingQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop_timeout(Duration::from_millis(10)), Some(1));
        assert_eq!(queue.pop_timeout(Duration::from_millis(10)), Some(2));
        assert_eq!(queue.pop_timeout(Duration::from_millis(10)), Some(3));
    }

    #[test]
    fn peek_front_does_not_remove_the_item() {
        let queue: BlockingQueue<u32> = BlockingQueue::new();
        queue.push(7);
        assert_eq!(queue.peek_front(), Some(7));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn a_push_from_another_thread_wakes_a_blocked_popper() {
        let queue = Arc::new(BlockingQueue::<u32>::new());
        let producer_queue = queue.clone();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            producer_queue.push(99);
        });
        let popped = queue.pop_timeout(Duration::from_secs(2));
        producer.join().unwrap();
        assert_eq!(popped, Some(99));
    }
}
