//! Asynchronous message-to-screenshot pipeline.
//!
//! Stages, connected by two bounded queues and the shared artifact cache:
//! - Ingestion: caches message text, queues a render task
//! - Rendering: a fixed pool of workers captures screenshots and caches them
//! - Dispatch: a rate-limited sender replies with the image or an error text
//!
//! # Example
//!
//! ```ignore
//! use textshot_core::pipeline::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), cache, renderer, source, messenger);
//! let handle = pipeline.spawn();
//!
//! // ... serve the render endpoint ...
//!
//! handle.shutdown();
//! ```

mod config;
mod ingest;
mod queue;
mod rate_limiter;
mod sender;
mod types;
mod worker;

pub use config::PipelineConfig;
pub use ingest::{ingest_event, IngestError, IngestionListener};
pub use queue::{
    bounded, dispatch_queue, task_queue, DispatchReceiver, DispatchSender, QueueClosed,
    QueueReceiver, QueueSender, TaskReceiver, TaskSender,
};
pub use rate_limiter::TokenBucket;
pub use sender::{deliver, DeliveryError, DeliveryKind, ThrottledSender};
pub use types::{IncomingRequest, PreparedResult, RENDER_ERROR_TEXT};
pub use worker::{process_request, RenderWorkerPool};

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::ArtifactCache;
use crate::messaging::{Messenger, UpdateSource};
use crate::renderer::Renderer;

/// All collaborators the pipeline needs, wired together by [`Pipeline::spawn`].
pub struct Pipeline {
    config: PipelineConfig,
    cache: Arc<dyn ArtifactCache>,
    renderer: Arc<dyn Renderer>,
    source: Arc<dyn UpdateSource>,
    messenger: Arc<dyn Messenger>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        cache: Arc<dyn ArtifactCache>,
        renderer: Arc<dyn Renderer>,
        source: Arc<dyn UpdateSource>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            cache,
            renderer,
            source,
            messenger,
        }
    }

    /// Creates the queues and spawns every stage.
    pub fn spawn(self) -> PipelineHandle {
        let (task_tx, task_rx) = task_queue(self.config.task_queue_capacity);
        let (dispatch_tx, dispatch_rx) = dispatch_queue(self.config.dispatch_queue_capacity);

        let sender = ThrottledSender::new(
            &self.config,
            dispatch_rx,
            Arc::clone(&self.cache),
            self.messenger,
        );
        let sender = tokio::spawn(sender.run());

        let workers = RenderWorkerPool::new(
            self.config.render_workers,
            self.renderer,
            Arc::clone(&self.cache),
            task_rx,
            dispatch_tx,
        )
        .spawn();

        let listener = IngestionListener::new(&self.config, self.source, self.cache, task_tx);
        let listener = tokio::spawn(listener.run());

        info!(
            render_workers = self.config.render_workers,
            task_queue_capacity = self.config.task_queue_capacity,
            dispatch_queue_capacity = self.config.dispatch_queue_capacity,
            "Pipeline started"
        );

        PipelineHandle {
            listener,
            workers,
            sender,
        }
    }
}

/// Join handles of the running stages.
pub struct PipelineHandle {
    listener: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
    sender: JoinHandle<()>,
}

impl PipelineHandle {
    /// Whether every stage has exited.
    pub fn is_finished(&self) -> bool {
        self.listener.is_finished()
            && self.sender.is_finished()
            && self.workers.iter().all(JoinHandle::is_finished)
    }

    /// Waits for the stages to drain and exit on their own.
    ///
    /// They do once the update source closes: the listener stops, the task
    /// queue closes behind it, the workers finish and the dispatch queue
    /// closes in turn.
    pub async fn join(self) {
        let _ = self.listener.await;
        for worker in self.workers {
            let _ = worker.await;
        }
        let _ = self.sender.await;
    }

    /// Stops every stage. Work already handed to detached tasks may finish.
    pub fn shutdown(self) {
        self.listener.abort();
        for worker in &self.workers {
            worker.abort();
        }
        self.sender.abort();
        info!("Pipeline stopped");
    }
}
