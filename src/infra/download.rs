//! HTTP download functionality
//!
//! Single-attempt downloads with a bounded timeout. Fallback across sources
//! is the caller's concern (see [`crate::core::mirror`]); this layer never
//! retries.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Download result containing file path and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// HTTP downloader with a per-request timeout
#[derive(Debug, Clone)]
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
    /// Whole-request timeout
    timeout: Duration,
}

impl DownloadManager {
    /// Create a download manager with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(defaults::FETCH_TIMEOUT_SECS))
    }

    /// Create a download manager with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .connect_timeout(timeout.min(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS)))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            timeout,
        }
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download `url` to `dest` in one attempt
    ///
    /// Parent directories are created as needed. The body is streamed into
    /// a sibling `.part` file that is renamed onto `dest` only once it is
    /// complete, so `dest` never holds a truncated download.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        let partial = partial_path(dest);
        let result = self.download_once(url, &partial).await;
        let result = match result {
            Ok(size) => tokio::fs::rename(&partial, dest)
                .await
                .map(|()| DownloadResult {
                    path: dest.to_path_buf(),
                    size,
                })
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                }),
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(&partial).await;
        }
        result
    }

    async fn download_once(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        // Create parent directories if needed
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(downloaded)
    }
}

/// In-progress download path for `dest` (`lib.so` becomes `lib.so.part`)
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_download_manager_default_timeout() {
        let manager = DownloadManager::new();
        assert_eq!(manager.timeout(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_download_success_creates_parents() {
        let mock_server = MockServer::start().await;
        let content = b"native library bytes";

        Mock::given(method("GET"))
            .and(path("/lib.so"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nested/dir/lib.so");
        let manager = DownloadManager::new();

        let result = manager
            .download(&format!("{}/lib.so", mock_server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), content);
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let dest = Path::new("/cache/native/libfoo.so");
        assert_eq!(partial_path(dest), Path::new("/cache/native/libfoo.so.part"));
    }

    #[tokio::test]
    async fn test_stale_partial_file_is_replaced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lib.so"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"complete".to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("lib.so");
        std::fs::write(partial_path(&dest), b"trunc").unwrap();

        DownloadManager::new()
            .download(&format!("{}/lib.so", mock_server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"complete");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_download_http_error_is_single_attempt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.so"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.so");
        let manager = DownloadManager::new();

        let result = manager
            .download(&format!("{}/missing.so", mock_server.uri()), &dest)
            .await;

        match result {
            Err(DownloadError::NetworkError { error, .. }) => assert!(error.contains("503")),
            other => panic!("Expected NetworkError, got: {other:?}"),
        }
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_download_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow.so"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("slow.so");
        let manager = DownloadManager::with_timeout(Duration::from_millis(200));

        let result = manager
            .download(&format!("{}/slow.so", mock_server.uri()), &dest)
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
