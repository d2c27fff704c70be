use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8085
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    pub secret: String,
    /// Long-poll timeout for getUpdates in seconds (default: 60)
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u32,
    /// Log raw Bot API traffic at debug level
    #[serde(default)]
    pub debug: bool,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

fn default_poll_timeout() -> u32 {
    60
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Artifact cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Redis URL (e.g., "redis://127.0.0.1:6379")
    #[serde(default = "default_cache_url")]
    pub url: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Expiry applied to every record, in seconds
    #[serde(default = "default_ttl")]
    pub default_ttl_secs: u64,
    /// How often the memory backend sweeps out expired records, in seconds
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            url: default_cache_url(),
            password: None,
            default_ttl_secs: default_ttl(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

fn default_cache_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_ttl() -> u64 {
    3600
}

fn default_purge_interval() -> u64 {
    60
}

/// Available cache backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

/// Remote browser (WebDriver) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (e.g., "http://localhost:8910")
    #[serde(default = "default_browser_url")]
    pub url: String,
    #[serde(default = "default_window_size")]
    pub window_width: u32,
    #[serde(default = "default_window_size")]
    pub window_height: u32,
    /// Prefix under which the browser reaches the render endpoint
    #[serde(default = "default_render_base_url")]
    pub render_base_url: String,
    #[serde(default = "default_browser_name")]
    pub browser_name: String,
    /// Timeout for a single WebDriver call in seconds (default: 30)
    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            url: default_browser_url(),
            window_width: default_window_size(),
            window_height: default_window_size(),
            render_base_url: default_render_base_url(),
            browser_name: default_browser_name(),
            timeout_secs: default_browser_timeout(),
        }
    }
}

fn default_browser_url() -> String {
    "http://localhost:8910".to_string()
}

fn default_window_size() -> u32 {
    1000
}

fn default_render_base_url() -> String {
    "http://127.0.0.1:8085".to_string()
}

fn default_browser_name() -> String {
    "chrome".to_string()
}

fn default_browser_timeout() -> u32 {
    30
}

/// Page template configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/index.html")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub telegram: SanitizedTelegramConfig,
    pub cache: SanitizedCacheConfig,
    pub browser: BrowserConfig,
    pub server: ServerConfig,
    pub template: TemplateConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub secret_configured: bool,
    pub timeout_secs: u32,
    pub debug: bool,
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCacheConfig {
    pub backend: String,
    pub url: String,
    pub password_configured: bool,
    pub default_ttl_secs: u64,
    pub purge_interval_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            telegram: SanitizedTelegramConfig {
                secret_configured: !config.telegram.secret.is_empty(),
                timeout_secs: config.telegram.timeout_secs,
                debug: config.telegram.debug,
                api_url: config.telegram.api_url.clone(),
            },
            cache: SanitizedCacheConfig {
                backend: match config.cache.backend {
                    CacheBackend::Redis => "redis".to_string(),
                    CacheBackend::Memory => "memory".to_string(),
                },
                url: config.cache.url.clone(),
                password_configured: config
                    .cache
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                default_ttl_secs: config.cache.default_ttl_secs,
                purge_interval_secs: config.cache.purge_interval_secs,
            },
            browser: config.browser.clone(),
            server: config.server.clone(),
            template: config.template.clone(),
            pipeline: config.pipeline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[telegram]
secret = "123:abc"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.telegram.secret, "123:abc");
        assert_eq!(config.telegram.timeout_secs, 60);
        assert!(!config.telegram.debug);
        assert_eq!(config.server.port, 8085);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.default_ttl_secs, 3600);
        assert_eq!(config.cache.purge_interval_secs, 60);
        assert_eq!(config.browser.window_width, 1000);
        assert_eq!(config.browser.window_height, 1000);
        assert_eq!(config.template.path, PathBuf::from("templates/index.html"));
        assert_eq!(config.pipeline.render_workers, 4);
    }

    #[test]
    fn test_deserialize_missing_telegram_fails() {
        let toml = r#"
[server]
port = 8085
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[telegram]
secret = "123:abc"
timeout_secs = 30
debug = true

[cache]
backend = "memory"
url = "redis://cache:6379"
password = "hunter2"
default_ttl_secs = 120

[browser]
url = "http://selenium:4444"
window_width = 800
window_height = 600
render_base_url = "http://textshot:8085"

[server]
host = "127.0.0.1"
port = 9000

[template]
path = "/etc/textshot/index.html"

[pipeline]
render_workers = 2
task_queue_capacity = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.telegram.debug);
        assert_eq!(config.telegram.timeout_secs, 30);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.password.as_deref(), Some("hunter2"));
        assert_eq!(config.cache.default_ttl_secs, 120);
        assert_eq!(config.browser.url, "http://selenium:4444");
        assert_eq!(config.browser.window_width, 800);
        assert_eq!(config.browser.render_base_url, "http://textshot:8085");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pipeline.render_workers, 2);
        assert_eq!(config.pipeline.task_queue_capacity, 10);
        assert_eq!(config.pipeline.dispatch_queue_capacity, 100);
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let toml = r#"
[telegram]
secret = "123:abc"

[cache]
password = "hunter2"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.telegram.secret_configured);
        assert!(sanitized.cache.password_configured);
        assert_eq!(sanitized.cache.backend, "redis");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("123:abc"));
        assert!(!json.contains("hunter2"));
    }
}
