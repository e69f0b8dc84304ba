//! Capture orchestration.
//!
//! The path from a submitted URL to a stored screenshot: normalize the input,
//! consult the result cache, call the remote capture backend, download the
//! rendered image, persist it under the screenshot directory, and record the
//! result. `capture` never propagates a raw error; every failure mode maps to
//! a `CaptureError` variant the presentation layer can display.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::random;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheEntry, ScreenshotCache};
use crate::hyperbrowser::CaptureBackend;
use crate::viewport::profile_for;

/// Extension used when the screenshot URL carries none.
const DEFAULT_EXTENSION: &str = ".webp";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("URL is required")]
    MissingInput,
    #[error("No screenshot URL found in the scrape result")]
    NoScreenshotProduced,
    #[error("Failed to download screenshot: {0}")]
    DownloadFailed(String),
    #[error("Failed to save screenshot file")]
    PersistFailed,
    #[error("Error occurred: {0}")]
    CaptureFailed(String),
}

/// A successful capture, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Path relative to the static assets root.
    pub display_path: String,
    /// Bare filename within the screenshot directory.
    pub filename: String,
    /// Whether the result came from the cache.
    pub cached: bool,
}

/// Ensure the URL carries a scheme, defaulting to https. Idempotent.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Capture orchestrator: owns the result cache and the download client,
/// delegates rendering to the backend.
pub struct Orchestrator {
    backend: Arc<dyn CaptureBackend>,
    http: Client,
    cache: ScreenshotCache,
    screenshot_dir: PathBuf,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        cache: ScreenshotCache,
        screenshot_dir: PathBuf,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend,
            http,
            cache,
            screenshot_dir,
        }
    }

    /// The result cache, shared across requests.
    #[must_use]
    pub fn cache(&self) -> &ScreenshotCache {
        &self.cache
    }

    /// The directory screenshot files are written to.
    #[must_use]
    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    /// Capture a screenshot of `raw_url` rendered for `device_class`.
    ///
    /// Serves from the cache when a live entry's file still exists on disk;
    /// otherwise performs a fresh remote capture.
    ///
    /// # Errors
    ///
    /// Returns a `CaptureError` describing the failure; never panics and
    /// never surfaces a raw transport error.
    pub async fn capture(
        &self,
        raw_url: &str,
        device_class: &str,
    ) -> Result<CaptureOutcome, CaptureError> {
        if raw_url.trim().is_empty() {
            return Err(CaptureError::MissingInput);
        }

        let url = normalize_url(raw_url);
        let key = ScreenshotCache::key(&url, device_class);

        if let Some(entry) = self.cache.get(&key) {
            // The sweeper may have deleted the file out from under the
            // cache; only a file that is still on disk counts as a hit.
            let path = self.screenshot_dir.join(&entry.filename);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                info!(key = %key, "Cache hit");
                return Ok(CaptureOutcome {
                    display_path: entry.display_path,
                    filename: entry.filename,
                    cached: true,
                });
            }
            debug!(key = %key, "Cache entry references a missing file, re-capturing");
        }

        let viewport = profile_for(device_class);
        info!(url = %url, device_class = %device_class, "Starting capture");

        let screenshot_url = self
            .backend
            .capture_screenshot(&url, viewport)
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("{e:#}")))?
            .ok_or(CaptureError::NoScreenshotProduced)?;

        debug!(screenshot_url = %screenshot_url, "Downloading screenshot");
        let response = self
            .http
            .get(&screenshot_url)
            .send()
            .await
            .map_err(|e| CaptureError::DownloadFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| CaptureError::DownloadFailed(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CaptureError::DownloadFailed(e.to_string()))?;

        let filename = format!(
            "hypercap_shot_{:032x}{}",
            random::<u128>(),
            extension_of(&screenshot_url)
        );
        let save_path = self.screenshot_dir.join(&filename);

        tokio::fs::write(&save_path, &bytes)
            .await
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        if !tokio::fs::try_exists(&save_path).await.unwrap_or(false) {
            warn!(path = %save_path.display(), "Screenshot file missing after write");
            return Err(CaptureError::PersistFailed);
        }

        info!(path = %save_path.display(), "Screenshot saved");

        let display_path = format!("screenshots/{filename}");
        self.cache.insert(
            key,
            CacheEntry {
                display_path: display_path.clone(),
                filename: filename.clone(),
            },
        );

        Ok(CaptureOutcome {
            display_path,
            filename,
            cached: false,
        })
    }
}

/// File extension (dot included) of the screenshot URL's path, defaulting
/// to `.webp` when the path has none.
fn extension_of(screenshot_url: &str) -> String {
    let ext = Url::parse(screenshot_url).ok().and_then(|parsed| {
        Path::new(parsed.path())
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
    });
    ext.unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_url(" http://x.com "), "http://x.com");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url("https://example.com/a"), "https://example.com/a");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["example.com", " http://x.com ", "https://y.org/path?q=1"] {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn test_extension_from_url_path() {
        assert_eq!(extension_of("https://cdn.example/img.png"), ".png");
        assert_eq!(extension_of("https://cdn.example/a/b/shot.jpeg"), ".jpeg");
    }

    #[test]
    fn test_extension_defaults_to_webp() {
        assert_eq!(extension_of("https://cdn.example/img"), ".webp");
        assert_eq!(extension_of("not a url"), ".webp");
    }

    #[test]
    fn test_extension_ignores_query_string() {
        assert_eq!(
            extension_of("https://cdn.example/img.png?token=abc.def"),
            ".png"
        );
    }
}
