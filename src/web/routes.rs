use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Form;
use axum::Router;
use serde::Deserialize;

use super::templates::{self, IndexView};
use super::AppState;
use crate::retention;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(capture))
        .route("/download/:filename", get(download))
        .route("/healthz", get(health))
}

async fn index(State(state): State<AppState>) -> Response {
    retention::sweep(
        state.capture.screenshot_dir(),
        state.config.retention_max_age,
    )
    .await;

    let view = IndexView::empty("desktop");
    Html(templates::render_index(&view)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CaptureForm {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    device_type: Option<String>,
}

async fn capture(State(state): State<AppState>, Form(form): Form<CaptureForm>) -> Response {
    retention::sweep(
        state.capture.screenshot_dir(),
        state.config.retention_max_age,
    )
    .await;

    let device_type = form.device_type.unwrap_or_else(|| "desktop".to_string());
    let url = form.url.unwrap_or_default();

    let result = state.capture.capture(&url, &device_type).await;
    if let Err(e) = &result {
        tracing::warn!(url = %url, device_type = %device_type, error = %e, "Capture failed");
    }

    let view = IndexView::from_result(&result, &device_type);
    Html(templates::render_index(&view)).into_response()
}

async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    // Basename-only: anything that could escape the screenshot directory
    // gets the same answer as a missing file.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return not_found();
    }

    let path = state.capture.screenshot_dir().join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Download file not found");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

async fn health() -> &'static str {
    "OK"
}
