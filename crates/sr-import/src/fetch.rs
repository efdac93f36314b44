//! Archive download
//!
//! The archive is streamed to `<archive>.part` and renamed into place once the
//! body has been read completely, so a failed download never leaves a file
//! that looks like a finished archive.

use futures::StreamExt;
use reqwest::Client;
use sr_common::{Result, SrError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::ReleaseSelection;

const USER_AGENT: &str = concat!("sr-import/", env!("CARGO_PKG_VERSION"));

/// Bytes received so far and the advertised length, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

pub type DownloadProgressFn<'a> = dyn Fn(DownloadProgress) + Send + Sync + 'a;

/// Temporary sibling used while `path` is being written
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Downloads release archives over HTTP
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SrError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Download the selected archive, returning its local path
    pub async fn fetch(&self, selection: &ReleaseSelection) -> Result<PathBuf> {
        self.fetch_with_progress(selection, None).await
    }

    pub async fn fetch_with_progress(
        &self,
        selection: &ReleaseSelection,
        on_progress: Option<&DownloadProgressFn<'_>>,
    ) -> Result<PathBuf> {
        let target = &selection.local_archive_file;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(target);
        match self.download(selection, &partial, on_progress).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, target).await?;
                info!(
                    url = %selection.url,
                    path = %target.display(),
                    bytes,
                    "Downloaded archive"
                );
                Ok(target.clone())
            },
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %partial.display(), error = %cleanup, "Failed to remove partial download");
                    }
                }
                Err(e)
            },
        }
    }

    async fn download(
        &self,
        selection: &ReleaseSelection,
        partial: &Path,
        on_progress: Option<&DownloadProgressFn<'_>>,
    ) -> Result<u64> {
        info!(url = %selection.url, "Downloading archive");

        let response = self
            .client
            .get(selection.url.clone())
            .send()
            .await
            .map_err(|e| SrError::network(format!("Request to {} failed: {}", selection.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SrError::network(format!(
                "Failed to download {}: HTTP {}",
                selection.url, status
            )));
        }

        let total = response.content_length();
        debug!(content_length = ?total, "Response received");

        let mut file = tokio::fs::File::create(partial).await?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                SrError::network(format!("Download of {} interrupted: {}", selection.url, e))
            })?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            if let Some(on_progress) = on_progress {
                on_progress(DownloadProgress { downloaded, total });
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(downloaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/data/sr24upd.zip")),
            PathBuf::from("/data/sr24upd.zip.part")
        );
    }
}
