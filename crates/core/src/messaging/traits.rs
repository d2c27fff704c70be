//! Trait definitions for the messaging module.

use async_trait::async_trait;

use super::types::{InboundEvent, MessagingError};

/// Stream of inbound events from the messaging source.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Waits for the next batch of events.
    ///
    /// Returns an empty batch when a poll window passes with no traffic and
    /// [`MessagingError::Closed`] once no further events will arrive.
    async fn next_events(&self) -> Result<Vec<InboundEvent>, MessagingError>;
}

/// Outbound replies to the messaging source.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a plain text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), MessagingError>;

    /// Sends image bytes as a photo attachment to a chat.
    async fn send_image(&self, chat_id: i64, image: Vec<u8>) -> Result<(), MessagingError>;
}
