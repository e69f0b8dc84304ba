use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hypercap::cache::ScreenshotCache;
use hypercap::capture::Orchestrator;
use hypercap::config::Config;
use hypercap::hyperbrowser::HyperbrowserClient;
use hypercap::web;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting hypercap");

    // Load and validate configuration; a missing API key aborts startup.
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    // Ensure the screenshot directory exists
    tokio::fs::create_dir_all(&config.screenshot_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create screenshot directory: {}",
                config.screenshot_dir.display()
            )
        })?;

    info!(screenshot_dir = %config.screenshot_dir.display(), "Configuration loaded");

    let backend = Arc::new(HyperbrowserClient::new(&config));
    let cache = ScreenshotCache::new(config.cache_ttl, config.cache_max_entries);
    let orchestrator = Arc::new(Orchestrator::new(
        backend,
        cache,
        config.screenshot_dir.clone(),
    ));

    // Start web server in background
    let web_config = config.clone();
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(web_config, orchestrator).await {
            error!("Web server error: {e:#}");
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutting down...");
    web_handle.abort();
    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hypercap=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
