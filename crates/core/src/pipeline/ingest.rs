//! Ingestion listener.
//!
//! Pulls events from the messaging source and turns each text message into a
//! queued render task. Every event runs in its own task so a full task queue
//! only holds up that event; a semaphore caps how many run at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::cache::{ArtifactCache, CacheError};
use crate::messaging::{InboundEvent, MessagingError, UpdateSource};
use crate::metrics;

use super::config::PipelineConfig;
use super::queue::{QueueClosed, TaskSender};
use super::types::IncomingRequest;

/// Error type for handling a single inbound event.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Text could not be cached, so no task was queued.
    #[error("Failed to cache text: {0}")]
    CacheWrite(#[from] CacheError),

    /// The task queue is gone.
    #[error(transparent)]
    QueueClosed(#[from] QueueClosed),
}

/// Long-running consumer of the messaging source.
pub struct IngestionListener {
    source: Arc<dyn UpdateSource>,
    cache: Arc<dyn ArtifactCache>,
    tasks: TaskSender,
    permits: Arc<Semaphore>,
    retry_delay: Duration,
}

impl IngestionListener {
    pub fn new(
        config: &PipelineConfig,
        source: Arc<dyn UpdateSource>,
        cache: Arc<dyn ArtifactCache>,
        tasks: TaskSender,
    ) -> Self {
        Self {
            source,
            cache,
            tasks,
            permits: Arc::new(Semaphore::new(config.ingestion_concurrency)),
            retry_delay: Duration::from_millis(config.poll_retry_delay_ms),
        }
    }

    /// Run the listener until the source closes.
    ///
    /// This should be spawned as a background task.
    pub async fn run(self) {
        info!("Ingestion listener started");

        loop {
            match self.source.next_events().await {
                Ok(events) => {
                    for event in events {
                        self.spawn_event(event).await;
                    }
                }
                Err(MessagingError::Closed) => break,
                Err(e) => {
                    if e.is_retryable() {
                        warn!(error = %e, "Failed to poll messaging source");
                    } else {
                        error!(error = %e, "Messaging source rejected poll");
                    }
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        info!("Ingestion listener shutting down");
    }

    async fn spawn_event(&self, event: InboundEvent) {
        if event.text.is_empty() {
            debug!(update_id = event.update_id, "Skipping event without text");
            metrics::EVENTS_SKIPPED.inc();
            return;
        }

        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return;
        };
        let cache = Arc::clone(&self.cache);
        let tasks = self.tasks.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let update_id = event.update_id;
            if let Err(e) = ingest_event(event, cache.as_ref(), &tasks).await {
                error!(request_id = update_id, error = %e, "Dropping inbound message");
                metrics::REQUESTS_DROPPED.with_label_values(&["ingest"]).inc();
            }
        });
    }
}

/// Caches the event text, then queues the render task.
///
/// The text write completes before the enqueue, so the render endpoint can
/// always serve a queued request. Waits while the task queue is full.
pub async fn ingest_event(
    event: InboundEvent,
    cache: &dyn ArtifactCache,
    tasks: &TaskSender,
) -> Result<(), IngestError> {
    let request = IncomingRequest {
        id: event.update_id,
        chat_id: event.chat_id,
        text: event.text,
    };

    info!(
        request_id = request.id,
        chat_id = request.chat_id,
        "[{}] {}",
        event.username.as_deref().unwrap_or("unknown"),
        request.text
    );

    if let Err(e) = cache.store_text(&request.cache_id(), &request.text).await {
        metrics::CACHE_WRITES
            .with_label_values(&["text", "error"])
            .inc();
        return Err(e.into());
    }
    metrics::CACHE_WRITES.with_label_values(&["text", "ok"]).inc();

    let request_id = request.id;
    tasks.send(request).await?;
    metrics::REQUESTS_INGESTED.inc();
    debug!(request_id, queued = tasks.len(), "Render task queued");
    Ok(())
}
