//! Mock messenger for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::messaging::{Messenger, MessagingError};

/// A reply recorded by the mock messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text { chat_id: i64, text: String },
    Image { chat_id: i64, image: Vec<u8> },
}

impl SentMessage {
    pub fn chat_id(&self) -> i64 {
        match self {
            SentMessage::Text { chat_id, .. } | SentMessage::Image { chat_id, .. } => *chat_id,
        }
    }
}

/// Mock implementation of the Messenger trait.
///
/// Records every reply with the instant it was sent and can be told to fail
/// all sends.
#[derive(Clone, Default)]
pub struct MockMessenger {
    sent: Arc<RwLock<Vec<(Instant, SentMessage)>>>,
    fail_sends: Arc<RwLock<bool>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all replies sent so far.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .read()
            .await
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Get the instants replies were sent at.
    pub async fn sent_at(&self) -> Vec<Instant> {
        self.sent.read().await.iter().map(|(at, _)| *at).collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// Make every send fail.
    pub async fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.write().await = fail;
    }

    /// Wait until at least `count` replies were sent, or `timeout` elapses.
    ///
    /// Returns whether the count was reached.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.sent_count().await >= count {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn record(&self, message: SentMessage) -> Result<(), MessagingError> {
        if *self.fail_sends.read().await {
            return Err(MessagingError::Api("mock send failure".to_string()));
        }
        self.sent.write().await.push((Instant::now(), message));
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), MessagingError> {
        self.record(SentMessage::Text {
            chat_id,
            text: text.to_string(),
        })
        .await
    }

    async fn send_image(&self, chat_id: i64, image: Vec<u8>) -> Result<(), MessagingError> {
        self.record(SentMessage::Image { chat_id, image }).await
    }
}
