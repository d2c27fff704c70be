pub mod cache;
pub mod config;
pub mod messaging;
pub mod metrics;
pub mod pipeline;
pub mod renderer;
pub mod template;
pub mod testing;

pub use cache::{create_cache, ArtifactCache, CacheError, CacheKey, MemoryCache, RedisCache};
pub use config::{
    load_config, load_config_from_str, validate_config, BrowserConfig, CacheBackend, CacheConfig,
    Config, ConfigError, SanitizedConfig, ServerConfig, TelegramConfig, TemplateConfig,
};
pub use messaging::{InboundEvent, Messenger, MessagingError, TelegramClient, UpdateSource};
pub use pipeline::{
    IncomingRequest, Pipeline, PipelineConfig, PipelineHandle, PreparedResult, RENDER_ERROR_TEXT,
};
pub use renderer::{RenderError, Renderer, WebDriverRenderer};
pub use template::{PageTemplate, TemplateError};
