//! Prometheus metrics for the pipeline.
//!
//! This module provides metrics for:
//! - Ingestion (events accepted, skipped)
//! - Cache writes per namespace
//! - Rendering (results, duration)
//! - Delivery and dropped requests

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Ingestion
// =============================================================================

/// Inbound events accepted into the pipeline.
pub static REQUESTS_INGESTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "textshot_requests_ingested_total",
        "Total inbound messages queued for rendering",
    )
    .unwrap()
});

/// Inbound events ignored because they carried no text.
pub static EVENTS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "textshot_events_skipped_total",
        "Total inbound events without text",
    )
    .unwrap()
});

// =============================================================================
// Cache
// =============================================================================

/// Cache writes by namespace and result.
pub static CACHE_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("textshot_cache_writes_total", "Total cache writes"),
        &["namespace", "result"], // "text"/"binary", "ok"/"error"
    )
    .unwrap()
});

// =============================================================================
// Rendering
// =============================================================================

/// Render attempts by result.
pub static RENDERS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("textshot_renders_total", "Total render attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Render duration in seconds.
pub static RENDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "textshot_render_duration_seconds",
            "Duration of a browser render",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Delivery
// =============================================================================

/// Delivery attempts by kind and result.
pub static DELIVERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("textshot_deliveries_total", "Total delivery attempts"),
        &["kind", "result"], // "image"/"text", "sent"/"failed"
    )
    .unwrap()
});

/// Requests abandoned without a reply, by pipeline stage.
pub static REQUESTS_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "textshot_requests_dropped_total",
            "Total requests abandoned without a reply",
        ),
        &["stage"], // "ingest", "render", "dispatch"
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(REQUESTS_INGESTED.clone()))
        .unwrap();
    registry.register(Box::new(EVENTS_SKIPPED.clone())).unwrap();
    registry.register(Box::new(CACHE_WRITES.clone())).unwrap();
    registry.register(Box::new(RENDERS.clone())).unwrap();
    registry.register(Box::new(RENDER_DURATION.clone())).unwrap();
    registry.register(Box::new(DELIVERIES.clone())).unwrap();
    registry.register(Box::new(REQUESTS_DROPPED.clone())).unwrap();
}

/// Encode all metrics in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
