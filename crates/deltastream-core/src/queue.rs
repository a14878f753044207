//! Bounded multi-producer event queue.
//!
//! [`EventQueue`] decouples the engine's dispatch threads from HTTP stream
//! consumers. It wraps a bounded [`tokio::sync::mpsc`] channel: publishing
//! uses `try_send` and never waits, so when the channel is full the new
//! item is dropped and counted. Draining suspends until an item arrives or
//! the queue is closed.
//!
//! # Consumers
//!
//! The single receiver sits behind an async mutex. Every call to
//! [`EventQueue::drain`] removes the item it returns, so with several
//! concurrent consumers each item reaches exactly one of them: items are
//! partitioned across consumers rather than broadcast.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

/// Default number of items the queue holds before dropping new ones.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Result of a [`EventQueue::publish`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The item was appended to the tail.
    Enqueued,
    /// The queue was full; the item was discarded.
    Dropped,
    /// The queue is closed; the item was discarded.
    Closed,
}

/// Point-in-time counters for a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Maximum number of buffered items.
    pub capacity: usize,
    /// Items currently buffered.
    pub len: usize,
    /// Whether the queue has been closed.
    pub closed: bool,
    /// Items accepted since creation.
    pub published: u64,
    /// Items handed to a consumer since creation.
    pub delivered: u64,
    /// Items discarded because the queue was full.
    pub dropped: u64,
}

/// A bounded FIFO queue with non-blocking publish and async drain.
///
/// Shared between producers and consumers through an [`Arc`](std::sync::Arc);
/// all synchronization is internal.
#[derive(Debug)]
pub struct EventQueue<T> {
    /// Producer half; `None` once closed. Dropping it is the close signal.
    sender: Mutex<Option<mpsc::Sender<T>>>,
    receiver: AsyncMutex<mpsc::Receiver<T>>,
    capacity: usize,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl<T> EventQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: AsyncMutex::new(receiver),
            capacity,
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<T>>> {
        // Critical sections are a single `try_send` or `take`, so a
        // poisoned slot is still consistent.
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item without waiting.
    ///
    /// Full or closed queues discard the item. Safe to call from any
    /// thread, with or without a Tokio runtime.
    pub fn publish(&self, item: T) -> PublishOutcome {
        let outcome = match self.sender().as_ref() {
            None => PublishOutcome::Closed,
            Some(sender) => match sender.try_send(item) {
                Ok(()) => PublishOutcome::Enqueued,
                Err(TrySendError::Full(_)) => PublishOutcome::Dropped,
                Err(TrySendError::Closed(_)) => PublishOutcome::Closed,
            },
        };

        match outcome {
            PublishOutcome::Enqueued => {
                self.published.fetch_add(1, Ordering::Relaxed);
            }
            PublishOutcome::Dropped => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            PublishOutcome::Closed => {}
        }
        outcome
    }

    /// Wait for the next item in FIFO order.
    ///
    /// Returns `None` once the queue is closed and every buffered item has
    /// been taken. Cancel-safe: dropping the future never loses an item.
    pub async fn drain(&self) -> Option<T> {
        let item = self.receiver.lock().await.recv().await?;
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Some(item)
    }

    /// Close the queue. Idempotent.
    ///
    /// Buffered items remain drainable; afterwards every drain returns
    /// `None` and every publish is discarded.
    pub fn close(&self) {
        if self.sender().take().is_some() {
            tracing::debug!("event queue closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.sender().is_none()
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        let published = self.published.load(Ordering::Relaxed);
        let delivered = self.delivered.load(Ordering::Relaxed);
        usize::try_from(published.saturating_sub(delivered))
            .unwrap_or(self.capacity)
            .min(self.capacity)
    }

    /// Whether no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered items.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Snapshot of the queue's counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            capacity: self.capacity,
            len: self.len(),
            closed: self.is_closed(),
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
