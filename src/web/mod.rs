mod routes;
pub mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::capture::Orchestrator;
use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub capture: Arc<Orchestrator>,
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn serve(config: Config, capture: Arc<Orchestrator>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let state = AppState {
        config: Arc::new(config),
        capture,
    };

    let app = create_app(state);

    info!(addr = %addr, "Starting web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app).await.context("Web server error")?;

    Ok(())
}

/// Create the main application router.
#[must_use]
pub fn create_app(state: AppState) -> Router {
    let static_dir = static_root(&state.config);
    info!(static_dir = ?static_dir, "Serving static files");

    Router::new()
        .merge(routes::router())
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The static assets root the screenshot directory lives under.
///
/// Screenshot display paths are relative to this root, so serving its parent
/// keeps `/static/screenshots/<file>` working for any configured directory.
fn static_root(config: &Config) -> PathBuf {
    config
        .screenshot_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("static"), PathBuf::from)
}
