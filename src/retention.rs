//! Screenshot file retention.
//!
//! Deletes on-disk screenshots past a fixed age. Runs opportunistically
//! before index requests; every failure is logged and swallowed so a broken
//! sweep can never fail the surrounding request.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Delete regular files in `dir` whose modification time is older than
/// `max_age`. Best-effort: unreadable entries and failed deletions are
/// logged and skipped.
pub async fn sweep(dir: &Path, max_age: Duration) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read screenshot directory");
            return;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to enumerate screenshot directory");
                break;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok());
        let Some(age) = age else {
            continue;
        };

        if age > max_age {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(path = %path.display(), "Removed old screenshot"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove old screenshot");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweep_removes_files_past_threshold() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("hypercap_shot_old.webp");
        tokio::fs::write(&old, b"img").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // With a zero threshold any existing file is past its age.
        sweep(dir.path(), Duration::ZERO).await;
        assert!(!old.exists());
    }

    #[tokio::test]
    async fn test_sweep_retains_young_files() {
        let dir = TempDir::new().unwrap();
        let fresh = dir.path().join("hypercap_shot_fresh.webp");
        tokio::fs::write(&fresh, b"img").await.unwrap();

        sweep(dir.path(), Duration::from_secs(3600)).await;
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_sweep_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("keep");
        tokio::fs::create_dir(&sub).await.unwrap();

        sweep(dir.path(), Duration::ZERO).await;
        assert!(sub.exists());
    }

    #[tokio::test]
    async fn test_sweep_on_missing_directory_does_not_panic() {
        sweep(Path::new("/nonexistent/hypercap-screenshots"), Duration::ZERO).await;
    }
}
