//! Throttled sender.
//!
//! Waits on the dispatch queue and, for each result, takes a token from the
//! rate limiter before spawning a detached delivery task. A slow delivery
//! never holds up the ones behind it.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::cache::{ArtifactCache, CacheError};
use crate::messaging::{Messenger, MessagingError};
use crate::metrics;

use super::config::PipelineConfig;
use super::queue::DispatchReceiver;
use super::rate_limiter::TokenBucket;
use super::types::PreparedResult;

/// What was sent for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Image,
    Text,
}

impl DeliveryKind {
    fn label(self) -> &'static str {
        match self {
            DeliveryKind::Image => "image",
            DeliveryKind::Text => "text",
        }
    }
}

/// Error type for a single delivery. Delivery failures are terminal.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The cached artifact could not be read.
    #[error("Artifact unavailable: {0}")]
    ArtifactUnavailable(#[from] CacheError),

    /// The messaging source rejected the reply.
    #[error("Failed to send reply: {0}")]
    Send(#[from] MessagingError),
}

/// Single task delivering prepared results back to the messaging source.
pub struct ThrottledSender {
    results: DispatchReceiver,
    cache: Arc<dyn ArtifactCache>,
    messenger: Arc<dyn Messenger>,
    limiter: TokenBucket,
}

impl ThrottledSender {
    pub fn new(
        config: &PipelineConfig,
        results: DispatchReceiver,
        cache: Arc<dyn ArtifactCache>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            results,
            cache,
            messenger,
            limiter: TokenBucket::new(config.sends_per_second, config.send_burst),
        }
    }

    /// Run the sender until the dispatch queue closes.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Throttled sender started");

        while let Some(result) = self.results.recv().await {
            self.limiter.acquire().await;

            let cache = Arc::clone(&self.cache);
            let messenger = Arc::clone(&self.messenger);
            tokio::spawn(async move {
                let request_id = result.id;
                let chat_id = result.chat_id;
                match deliver(result, cache.as_ref(), messenger.as_ref()).await {
                    Ok(kind) => {
                        debug!(request_id, chat_id, kind = kind.label(), "Reply delivered");
                    }
                    Err(e) => {
                        error!(request_id, chat_id, error = %e, "Delivery abandoned");
                    }
                }
            });
        }

        info!("Throttled sender shutting down");
    }
}

/// Delivers one result: the error text if rendering failed, otherwise the
/// cached screenshot as an image.
pub async fn deliver(
    result: PreparedResult,
    cache: &dyn ArtifactCache,
    messenger: &dyn Messenger,
) -> Result<DeliveryKind, DeliveryError> {
    if !result.is_success() {
        let sent = messenger.send_text(result.chat_id, &result.error_text).await;
        record(DeliveryKind::Text, sent.is_ok());
        sent?;
        return Ok(DeliveryKind::Text);
    }

    let image = match cache.get_binary(&result.cache_id()).await {
        Ok(image) => image,
        Err(e) => {
            metrics::REQUESTS_DROPPED
                .with_label_values(&["dispatch"])
                .inc();
            return Err(e.into());
        }
    };

    let sent = messenger.send_image(result.chat_id, image).await;
    record(DeliveryKind::Image, sent.is_ok());
    sent?;
    Ok(DeliveryKind::Image)
}

fn record(kind: DeliveryKind, ok: bool) {
    let outcome = if ok { "sent" } else { "failed" };
    metrics::DELIVERIES
        .with_label_values(&[kind.label(), outcome])
        .inc();
}
