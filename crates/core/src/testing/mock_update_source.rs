//! Mock update source for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::messaging::{InboundEvent, MessagingError, UpdateSource};

type Batch = Result<Vec<InboundEvent>, MessagingError>;

/// Update source fed by the test.
///
/// Each pushed batch is returned by one `next_events` call. Once every clone
/// is closed (or dropped) and the pushed batches are drained, the source
/// reports [`MessagingError::Closed`].
#[derive(Clone)]
pub struct MockUpdateSource {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<Batch>>>>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Batch>>>,
}

impl Default for MockUpdateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUpdateSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Queue a batch of events.
    pub async fn push(&self, events: Vec<InboundEvent>) {
        self.send(Ok(events)).await;
    }

    /// Queue a polling failure.
    pub async fn push_error(&self, error: MessagingError) {
        self.send(Err(error)).await;
    }

    /// End the stream after the queued batches.
    pub async fn close(&self) {
        self.tx.lock().await.take();
    }

    async fn send(&self, batch: Batch) {
        if let Some(tx) = self.tx.lock().await.as_ref() {
            let _ = tx.send(batch);
        }
    }
}

#[async_trait]
impl UpdateSource for MockUpdateSource {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, MessagingError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.unwrap_or(Err(MessagingError::Closed))
    }
}
