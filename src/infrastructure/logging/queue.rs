//! Bounded FIFO queue shared between log producers and a single consumer.
//!
//! Producers never wait: when the queue is full the oldest item is discarded
//! to make room. The consumer awaits new items and sees the queue close once
//! every remaining item has been taken.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// Result of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted without displacing anything
    Accepted,
    /// Accepted after discarding the oldest queued item
    DisplacedOldest,
    /// Queue closed; the item was discarded
    Closed,
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
    dropped: u64,
}

/// Drop-oldest bounded queue
#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    notify: Notify,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
                dropped: 0,
            }),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append `item`, discarding the oldest item when full.
    pub fn push(&self, item: T) -> PushOutcome {
        let outcome = {
            let mut state = self.lock();
            if state.closed {
                state.dropped += 1;
                return PushOutcome::Closed;
            }
            let outcome = if state.items.len() >= self.capacity {
                state.items.pop_front();
                state.dropped += 1;
                PushOutcome::DisplacedOldest
            } else {
                PushOutcome::Accepted
            };
            state.items.push_back(item);
            outcome
        };
        self.notify.notify_one();
        outcome
    }

    /// Take everything currently queued without waiting
    pub fn take_all(&self) -> Vec<T> {
        self.lock().items.drain(..).collect()
    }

    /// Wait for at least one item and take everything queued.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn recv_batch(&self) -> Option<Vec<T>> {
        loop {
            {
                let mut state = self.lock();
                if !state.items.is_empty() {
                    return Some(state.items.drain(..).collect());
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Wait for the next item in FIFO order.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<T> {
        loop {
            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Stop accepting items. Items already queued remain receivable.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items discarded by overflow or after close
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    /// Maximum number of queued items
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_drop_oldest_on_overflow() {
        let queue = BoundedQueue::new(2);
        assert_eq!(queue.push(1), PushOutcome::Accepted);
        assert_eq!(queue.push(2), PushOutcome::Accepted);
        assert_eq!(queue.push(3), PushOutcome::DisplacedOldest);
        assert_eq!(queue.take_all(), vec![2, 3]);
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn test_push_after_close_is_rejected() {
        let queue = BoundedQueue::new(4);
        queue.push("a");
        queue.close();
        assert_eq!(queue.push("b"), PushOutcome::Closed);
        assert_eq!(queue.take_all(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_recv_batch_waits_for_items() {
        let queue = Arc::new(BoundedQueue::new(8));
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.recv_batch().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(7);
        let batch = consumer.await.unwrap();
        assert_eq!(batch, Some(vec![7]));
    }

    #[tokio::test]
    async fn test_close_drains_remaining_then_ends() {
        let queue = BoundedQueue::new(8);
        queue.push(1);
        queue.push(2);
        queue.close();
        assert_eq!(queue.recv().await, Some(1));
        assert_eq!(queue.recv().await, Some(2));
        assert_eq!(queue.recv().await, None);
        assert_eq!(queue.recv_batch().await, None);
    }
}
