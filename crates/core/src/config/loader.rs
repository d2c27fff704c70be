use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("TEXTSHOT_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[telegram]
secret = "123:abc"

[server]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_config_from_str_missing_telegram() {
        let toml = r#"
[server]
port = 8085
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        // Runs inside a jail so env overrides set by other tests stay out.
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[telegram]
secret = "123:abc"

[server]
host = "127.0.0.1"
port = 3000

[pipeline]
render_workers = 8
"#,
            )?;

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.server.host.to_string(), "127.0.0.1");
            assert_eq!(config.pipeline.render_workers, 8);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_take_precedence_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[telegram]
secret = "from-file"

[pipeline]
render_workers = 8
"#,
            )?;
            jail.set_env("TEXTSHOT_PIPELINE__RENDER_WORKERS", "3");
            jail.set_env("TEXTSHOT_TELEGRAM__SECRET", "from-env");
            jail.set_env("TEXTSHOT_CACHE__BACKEND", "memory");

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.pipeline.render_workers, 3);
            assert_eq!(config.telegram.secret, "from-env");
            assert_eq!(config.cache.backend, crate::config::CacheBackend::Memory);
            // Keys absent from both sources keep their defaults.
            assert_eq!(config.cache.purge_interval_secs, 60);
            Ok(())
        });
    }
}
