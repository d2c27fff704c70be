//! Bounded FIFO queues connecting the pipeline stages.
//!
//! Senders suspend while a queue is full, which is the only backpressure in
//! the pipeline. Receivers can be cloned so several workers compete for the
//! same queue; the receiving end sits behind a fair mutex, so idle workers are
//! served in the order they started waiting and items leave in FIFO order.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use super::types::{IncomingRequest, PreparedResult};

/// The receiving side of a queue has gone away.
#[derive(Debug, Error)]
#[error("{0} queue is closed")]
pub struct QueueClosed(pub &'static str);

/// Producer handle for a bounded queue.
pub struct QueueSender<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send> QueueSender<T> {
    /// Appends an item, waiting for a free slot while the queue is full.
    pub async fn send(&self, item: T) -> Result<(), QueueClosed> {
        if self.tx.capacity() == 0 {
            debug!(queue = self.name, "Queue full, waiting for a free slot");
        }
        self.tx.send(item).await.map_err(|_| QueueClosed(self.name))
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Consumer handle for a bounded queue, shareable between workers.
pub struct QueueReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T: Send> QueueReceiver<T> {
    /// Waits for the next item. Returns `None` once every sender is dropped
    /// and the queue is drained.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

/// Creates a bounded queue.
pub fn bounded<T>(name: &'static str, capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        QueueSender { name, tx },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

pub type TaskSender = QueueSender<IncomingRequest>;
pub type TaskReceiver = QueueReceiver<IncomingRequest>;
pub type DispatchSender = QueueSender<PreparedResult>;
pub type DispatchReceiver = QueueReceiver<PreparedResult>;

/// Creates the queue between ingestion and the render workers.
pub fn task_queue(capacity: usize) -> (TaskSender, TaskReceiver) {
    bounded("task", capacity)
}

/// Creates the queue between the render workers and the sender.
pub fn dispatch_queue(capacity: usize) -> (DispatchSender, DispatchReceiver) {
    bounded("dispatch", capacity)
}
