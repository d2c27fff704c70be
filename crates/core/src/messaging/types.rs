//! Types for the messaging module.

use thiserror::Error;

/// A message received from the messaging source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Identifier of the update; unique per inbound event.
    pub update_id: i64,
    /// Chat the reply goes to.
    pub chat_id: i64,
    /// Sender's username, if they have one.
    pub username: Option<String>,
    /// Message text; empty for non-text messages.
    pub text: String,
}

/// Errors returned by messaging clients.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The bot token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with an error.
    #[error("API error: {0}")]
    Api(String),

    /// The request never completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The event stream has ended.
    #[error("Event stream closed")]
    Closed,
}

impl MessagingError {
    /// Whether polling again later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Transport(_) | Self::Timeout)
    }
}
