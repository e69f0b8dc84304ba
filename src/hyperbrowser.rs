//! Hyperbrowser remote capture client.
//!
//! The actual page load and screenshot rendering happens in Hyperbrowser's
//! cloud browsers. This module starts a scrape job configured for screenshot
//! output, polls it to completion, and hands back the URL of the rendered
//! image. The `CaptureBackend` trait is the seam the orchestrator and the
//! tests use, so the network never has to be involved in testing.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::viewport::ViewportProfile;

/// Load timeout passed to the remote session, in milliseconds.
const WAIT_TIMEOUT_MS: u64 = 30_000;

/// Settle delay after page load, in milliseconds.
const DELAY_AFTER_LOAD_MS: u64 = 2_000;

/// Interval between job status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Overall deadline for a scrape job, start to finish.
const JOB_DEADLINE: Duration = Duration::from_secs(120);

/// A service that can render a page and produce a screenshot.
///
/// Returns the URL of the rendered image, or `None` when the service
/// completed without producing one.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    async fn capture_screenshot(
        &self,
        url: &str,
        viewport: ViewportProfile,
    ) -> Result<Option<String>>;
}

/// Client for the Hyperbrowser scrape API.
pub struct HyperbrowserClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionOptions {
    accept_cookies: bool,
    use_stealth: bool,
    use_proxy: bool,
    solve_captchas: bool,
    wait_for_load: bool,
    wait_timeout: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeOptions {
    formats: Vec<String>,
    only_main_content: bool,
    include_tags: Vec<String>,
    exclude_tags: Vec<String>,
    viewport_width: u32,
    viewport_height: u32,
    device_scale_factor: f64,
    wait_for_network_idle: bool,
    delay_after_load: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartScrapeJob {
    url: String,
    session_options: SessionOptions,
    scrape_options: ScrapeOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartScrapeResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeJobStatus {
    status: String,
    #[serde(default)]
    data: Option<ScrapeJobData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeJobData {
    #[serde(default)]
    screenshot: Option<String>,
}

impl HyperbrowserClient {
    /// Create a client from the application configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn start_job_request(url: &str, viewport: ViewportProfile) -> StartScrapeJob {
        StartScrapeJob {
            url: url.to_string(),
            session_options: SessionOptions {
                accept_cookies: true,
                use_stealth: true,
                use_proxy: false,
                solve_captchas: false,
                wait_for_load: true,
                wait_timeout: WAIT_TIMEOUT_MS,
            },
            scrape_options: ScrapeOptions {
                formats: vec!["screenshot".to_string()],
                only_main_content: true,
                include_tags: Vec::new(),
                exclude_tags: Vec::new(),
                viewport_width: viewport.width,
                viewport_height: viewport.height,
                device_scale_factor: viewport.device_scale_factor,
                wait_for_network_idle: true,
                delay_after_load: DELAY_AFTER_LOAD_MS,
            },
        }
    }

    async fn start_job(&self, url: &str, viewport: ViewportProfile) -> Result<String> {
        let body = Self::start_job_request(url, viewport);

        let response = self
            .client
            .post(format!("{}/api/scrape", self.api_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to start scrape job")?
            .error_for_status()
            .context("Scrape job rejected")?;

        let started: StartScrapeResponse = response
            .json()
            .await
            .context("Failed to decode scrape job response")?;

        debug!(job_id = %started.job_id, url = %url, "Scrape job started");
        Ok(started.job_id)
    }

    async fn poll_job(&self, job_id: &str) -> Result<Option<String>> {
        let started_at = Instant::now();

        loop {
            let status: ScrapeJobStatus = self
                .client
                .get(format!("{}/api/scrape/{job_id}", self.api_url))
                .header("x-api-key", &self.api_key)
                .send()
                .await
                .context("Failed to poll scrape job")?
                .error_for_status()
                .context("Scrape job status request rejected")?
                .json()
                .await
                .context("Failed to decode scrape job status")?;

            match status.status.as_str() {
                "completed" => {
                    return Ok(status.data.and_then(|data| data.screenshot));
                }
                "failed" => {
                    let message = status.error.unwrap_or_else(|| "unknown error".to_string());
                    bail!("Scrape job failed: {message}");
                }
                other => {
                    debug!(job_id = %job_id, status = %other, "Scrape job in progress");
                }
            }

            if started_at.elapsed() > JOB_DEADLINE {
                bail!("Scrape job {job_id} did not finish within {JOB_DEADLINE:?}");
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl CaptureBackend for HyperbrowserClient {
    async fn capture_screenshot(
        &self,
        url: &str,
        viewport: ViewportProfile,
    ) -> Result<Option<String>> {
        info!(url = %url, width = viewport.width, height = viewport.height, "Starting remote capture");
        let job_id = self.start_job(url, viewport).await?;
        self.poll_job(&job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::profile_for;

    #[test]
    fn test_start_job_payload_shape() {
        let body = HyperbrowserClient::start_job_request("https://example.com", profile_for("mobile"));
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["sessionOptions"]["acceptCookies"], true);
        assert_eq!(value["sessionOptions"]["useStealth"], true);
        assert_eq!(value["sessionOptions"]["useProxy"], false);
        assert_eq!(value["sessionOptions"]["solveCaptchas"], false);
        assert_eq!(value["sessionOptions"]["waitTimeout"], 30_000);
        assert_eq!(value["scrapeOptions"]["formats"][0], "screenshot");
        assert_eq!(value["scrapeOptions"]["onlyMainContent"], true);
        assert_eq!(value["scrapeOptions"]["viewportWidth"], 375);
        assert_eq!(value["scrapeOptions"]["viewportHeight"], 667);
        assert_eq!(value["scrapeOptions"]["deviceScaleFactor"], 2.0);
        assert_eq!(value["scrapeOptions"]["waitForNetworkIdle"], true);
        assert_eq!(value["scrapeOptions"]["delayAfterLoad"], 2_000);
    }

    #[test]
    fn test_job_status_decodes_without_data() {
        let status: ScrapeJobStatus =
            serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(status.status, "pending");
        assert!(status.data.is_none());
        assert!(status.error.is_none());
    }

    #[test]
    fn test_job_status_decodes_screenshot() {
        let status: ScrapeJobStatus = serde_json::from_str(
            r#"{"status":"completed","data":{"screenshot":"https://cdn.example/img.png"}}"#,
        )
        .unwrap();
        assert_eq!(
            status.data.and_then(|d| d.screenshot).as_deref(),
            Some("https://cdn.example/img.png")
        );
    }
}
