use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use textshot_core::{
    create_cache, load_config, validate_config, ArtifactCache, PageTemplate, Pipeline,
    SanitizedConfig, TelegramClient, WebDriverRenderer,
};

use textshot_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    let json_logs = std::env::var("TEXTSHOT_LOG_FORMAT").is_ok_and(|format| format == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // Determine config path
    let config_path = std::env::var("TEXTSHOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Load the page template once; the render endpoint shares it
    let template = Arc::new(
        PageTemplate::load(&config.template.path)
            .with_context(|| format!("Failed to load template {:?}", config.template.path))?,
    );
    info!("Template loaded from {:?}", config.template.path);

    // Connect the artifact cache
    let cache: Arc<dyn ArtifactCache> = create_cache(&config.cache)
        .await
        .context("Failed to connect artifact cache")?;
    info!("Using {} artifact cache", cache.name());

    // Authorize against the messaging API
    let telegram = Arc::new(
        TelegramClient::new(config.telegram.clone()).context("Failed to create Telegram client")?,
    );
    telegram
        .authorize()
        .await
        .context("Failed to authorize bot account")?;

    // Screenshot renderer
    let renderer = Arc::new(
        WebDriverRenderer::new(config.browser.clone()).context("Failed to create renderer")?,
    );
    info!("Rendering through WebDriver at {}", config.browser.url);

    // Start the pipeline stages
    let pipeline = Pipeline::new(
        config.pipeline.clone(),
        Arc::clone(&cache),
        renderer,
        telegram.clone(),
        telegram,
    )
    .spawn();

    // Create router
    let state = Arc::new(AppState::new(Arc::clone(&cache), template));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            pipeline.shutdown();
            cache.close().await;
            return Err(e).with_context(|| format!("Failed to bind to {}", addr));
        }
    };

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Server shutting down...");
    pipeline.shutdown();
    cache.close().await;
    info!("Artifact cache closed");

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
