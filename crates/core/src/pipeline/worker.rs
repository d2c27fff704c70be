//! Render worker pool.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::ArtifactCache;
use crate::metrics;
use crate::renderer::Renderer;

use super::queue::{DispatchSender, TaskReceiver};
use super::types::{IncomingRequest, PreparedResult, RENDER_ERROR_TEXT};

/// Fixed set of workers turning queued requests into prepared results.
pub struct RenderWorkerPool {
    workers: usize,
    renderer: Arc<dyn Renderer>,
    cache: Arc<dyn ArtifactCache>,
    tasks: TaskReceiver,
    results: DispatchSender,
}

impl RenderWorkerPool {
    pub fn new(
        workers: usize,
        renderer: Arc<dyn Renderer>,
        cache: Arc<dyn ArtifactCache>,
        tasks: TaskReceiver,
        results: DispatchSender,
    ) -> Self {
        Self {
            workers,
            renderer,
            cache,
            tasks,
            results,
        }
    }

    /// Spawns the workers. Each runs until the task queue closes.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        info!(
            workers = self.workers,
            renderer = self.renderer.name(),
            "Starting render workers"
        );

        (0..self.workers)
            .map(|worker_id| {
                let renderer = Arc::clone(&self.renderer);
                let cache = Arc::clone(&self.cache);
                let tasks = self.tasks.clone();
                let results = self.results.clone();
                tokio::spawn(run_worker(worker_id, renderer, cache, tasks, results))
            })
            .collect()
    }
}

async fn run_worker(
    worker_id: usize,
    renderer: Arc<dyn Renderer>,
    cache: Arc<dyn ArtifactCache>,
    tasks: TaskReceiver,
    results: DispatchSender,
) {
    debug!(worker_id, "Render worker started");

    while let Some(request) = tasks.recv().await {
        let Some(result) = process_request(request, renderer.as_ref(), cache.as_ref()).await
        else {
            continue;
        };

        if let Err(e) = results.send(result).await {
            error!(worker_id, error = %e, "Render worker stopping");
            return;
        }
    }

    debug!(worker_id, "Render worker stopped");
}

/// Renders one request.
///
/// Returns the result to dispatch, or `None` when the screenshot could not be
/// cached. That request is dropped without a reply: the sender could not fetch
/// the artifact anyway, and nothing in the pipeline retries.
pub async fn process_request(
    request: IncomingRequest,
    renderer: &dyn Renderer,
    cache: &dyn ArtifactCache,
) -> Option<PreparedResult> {
    let started = Instant::now();
    let rendered = renderer.render(request.id).await;
    let elapsed = started.elapsed().as_secs_f64();

    let image = match rendered {
        Ok(image) => {
            metrics::RENDERS.with_label_values(&["success"]).inc();
            metrics::RENDER_DURATION
                .with_label_values(&["success"])
                .observe(elapsed);
            image
        }
        Err(e) => {
            warn!(request_id = request.id, error = %e, "Render failed");
            metrics::RENDERS.with_label_values(&["failed"]).inc();
            metrics::RENDER_DURATION
                .with_label_values(&["failed"])
                .observe(elapsed);
            return Some(PreparedResult::failure(request, RENDER_ERROR_TEXT));
        }
    };

    if let Err(e) = cache.store_binary(&request.cache_id(), &image).await {
        error!(request_id = request.id, error = %e, "Failed to cache screenshot, dropping request");
        metrics::CACHE_WRITES
            .with_label_values(&["binary", "error"])
            .inc();
        metrics::REQUESTS_DROPPED.with_label_values(&["render"]).inc();
        return None;
    }
    metrics::CACHE_WRITES
        .with_label_values(&["binary", "ok"])
        .inc();

    debug!(request_id = request.id, bytes = image.len(), "Screenshot cached");
    Some(PreparedResult::success(request))
}
