use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Telegram secret is present
/// - Cache TTL and browser window size are non-zero
/// - Pipeline sizes are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.telegram.secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "telegram.secret cannot be empty".to_string(),
        ));
    }

    if config.cache.default_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.default_ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.cache.purge_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.purge_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.browser.window_width == 0 || config.browser.window_height == 0 {
        return Err(ConfigError::ValidationError(
            "browser window dimensions cannot be 0".to_string(),
        ));
    }

    let pipeline = &config.pipeline;
    for (name, value) in [
        ("render_workers", pipeline.render_workers),
        ("ingestion_concurrency", pipeline.ingestion_concurrency),
        ("task_queue_capacity", pipeline.task_queue_capacity),
        ("dispatch_queue_capacity", pipeline.dispatch_queue_capacity),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.{} cannot be 0",
                name
            )));
        }
    }

    if pipeline.sends_per_second == 0 || pipeline.send_burst == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline send rate cannot be 0".to_string(),
        ));
    }

    Ok(())
}
