//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};

/// Sizing and pacing of the processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of render workers pulling from the task queue.
    #[serde(default = "default_render_workers")]
    pub render_workers: usize,

    /// Maximum inbound events handled at once.
    #[serde(default = "default_ingestion_concurrency")]
    pub ingestion_concurrency: usize,

    /// Capacity of the task queue.
    #[serde(default = "default_queue_capacity")]
    pub task_queue_capacity: usize,

    /// Capacity of the dispatch queue.
    #[serde(default = "default_queue_capacity")]
    pub dispatch_queue_capacity: usize,

    /// Sustained outbound delivery rate.
    #[serde(default = "default_sends_per_second")]
    pub sends_per_second: u32,

    /// Deliveries allowed back to back before pacing kicks in.
    #[serde(default = "default_send_burst")]
    pub send_burst: u32,

    /// Delay before polling the messaging source again after an error.
    #[serde(default = "default_poll_retry_delay")]
    pub poll_retry_delay_ms: u64,
}

fn default_render_workers() -> usize {
    4
}

fn default_ingestion_concurrency() -> usize {
    32
}

fn default_queue_capacity() -> usize {
    100
}

fn default_sends_per_second() -> u32 {
    25
}

fn default_send_burst() -> u32 {
    25
}

fn default_poll_retry_delay() -> u64 {
    1000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_workers: default_render_workers(),
            ingestion_concurrency: default_ingestion_concurrency(),
            task_queue_capacity: default_queue_capacity(),
            dispatch_queue_capacity: default_queue_capacity(),
            sends_per_second: default_sends_per_second(),
            send_burst: default_send_burst(),
            poll_retry_delay_ms: default_poll_retry_delay(),
        }
    }
}

impl PipelineConfig {
    /// Sets the number of render workers.
    pub fn with_render_workers(mut self, workers: usize) -> Self {
        self.render_workers = workers;
        self
    }

    /// Sets both queue capacities.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.task_queue_capacity = capacity;
        self.dispatch_queue_capacity = capacity;
        self
    }

    /// Sets the outbound rate and burst.
    pub fn with_send_rate(mut self, per_second: u32, burst: u32) -> Self {
        self.sends_per_second = per_second;
        self.send_burst = burst;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.render_workers, 4);
        assert_eq!(config.task_queue_capacity, 100);
        assert_eq!(config.dispatch_queue_capacity, 100);
        assert_eq!(config.sends_per_second, 25);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_render_workers(8)
            .with_queue_capacity(5)
            .with_send_rate(10, 2);

        assert_eq!(config.render_workers, 8);
        assert_eq!(config.task_queue_capacity, 5);
        assert_eq!(config.dispatch_queue_capacity, 5);
        assert_eq!(config.sends_per_second, 10);
        assert_eq!(config.send_burst, 2);
    }
}
