use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::Transport;

/// Whether an existing file at the destination satisfies the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Presence of the file is enough; no network call is made.
    ReuseExisting,
    /// Always download, replacing whatever is there.
    AlwaysRefresh,
}

/// A single file to download.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub url: String,
    pub dest: PathBuf,
    pub policy: CachePolicy,
}

impl DownloadTask {
    pub fn cached(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            policy: CachePolicy::ReuseExisting,
        }
    }

    pub fn refreshed(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            policy: CachePolicy::AlwaysRefresh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cached,
    Downloaded { bytes: u64 },
}

/// Cache-by-presence downloader. Bodies are streamed to `<dest>.part` and
/// renamed into place only once complete.
pub struct Downloader {
    transport: Arc<dyn Transport>,
    /// Maximum number of downloads in flight for [`Downloader::fetch_all`].
    concurrency: usize,
}

impl Downloader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    // ── Single file download ────────────────────────────

    pub async fn fetch(&self, task: &DownloadTask) -> InstallerResult<FetchOutcome> {
        if task.policy == CachePolicy::ReuseExisting && is_regular_file(&task.dest).await {
            debug!("Cached: {:?}", task.dest);
            return Ok(FetchOutcome::Cached);
        }

        if let Some(parent) = task.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallerError::io(parent, e))?;
        }

        let partial = partial_path(&task.dest);
        let result = self.stream_into(&task.url, &partial).await;

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&partial, &task.dest)
            .await
            .map_err(|e| InstallerError::io(&task.dest, e))?;

        debug!("Downloaded: {} -> {:?} ({} bytes)", task.url, task.dest, bytes);
        Ok(FetchOutcome::Downloaded { bytes })
    }

    async fn stream_into(&self, url: &str, path: &Path) -> InstallerResult<u64> {
        // Scoped so the handle is closed before the rename.
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| InstallerError::io(path, e))?;
        let bytes = self.transport.stream_to(url, &mut file).await?;
        file.flush().await.map_err(|e| InstallerError::io(path, e))?;
        Ok(bytes)
    }

    // ── Batch downloads ─────────────────────────────────

    /// Run every task, at most `concurrency` at a time. Outcomes come back in
    /// task order; the first failure aborts the batch and no further task is
    /// started.
    pub async fn fetch_all(&self, tasks: &[DownloadTask]) -> InstallerResult<Vec<FetchOutcome>> {
        info!(
            "Starting batch download: {} files, concurrency={}",
            tasks.len(),
            self.concurrency
        );

        stream::iter(tasks)
            .map(|task| self.fetch(task))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
