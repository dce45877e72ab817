//! Mirror-fallback resolution
//!
//! A resource hosted under a known upstream prefix (GitHub release assets)
//! can also be fetched through mirrors that proxy the same path. Candidates
//! are tried strictly in order: the original URL, then each mirror in
//! configuration order. The first complete download wins.

use std::path::{Path, PathBuf};

use crate::error::DownloadError;
use crate::infra::download::DownloadManager;

/// Upstream prefix and the mirrors standing in for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSet {
    /// Prefix the canonical URL starts with
    pub upstream: String,
    /// Replacement prefixes, in the order they are tried
    pub mirrors: Vec<String>,
}

impl MirrorSet {
    /// Create a mirror set
    pub fn new(upstream: impl Into<String>, mirrors: Vec<String>) -> Self {
        Self {
            upstream: upstream.into(),
            mirrors,
        }
    }

    /// Ordered candidate URLs for a resource
    ///
    /// The input URL is always first. A URL outside the upstream prefix has
    /// no mirror candidates.
    ///
    /// # Examples
    /// ```
    /// use stepup_release::core::mirror::MirrorSet;
    ///
    /// let set = MirrorSet::new("https://github.com/", vec!["https://m.example/gh/".into()]);
    /// assert_eq!(
    ///     set.candidates("https://github.com/o/r/releases/download/v1/lib.so"),
    ///     vec![
    ///         "https://github.com/o/r/releases/download/v1/lib.so".to_string(),
    ///         "https://m.example/gh/o/r/releases/download/v1/lib.so".to_string(),
    ///     ]
    /// );
    /// ```
    pub fn candidates(&self, url: &str) -> Vec<String> {
        let mut candidates = vec![url.to_string()];
        if let Some(rest) = url.strip_prefix(&self.upstream) {
            candidates.extend(self.mirrors.iter().map(|mirror| format!("{mirror}{rest}")));
        }
        candidates
    }
}

/// How a resource was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedResource {
    /// The destination already existed; nothing was fetched
    AlreadyPresent(PathBuf),
    /// Fetched from the candidate at `index` (0 is the original URL)
    Downloaded {
        /// Destination path
        path: PathBuf,
        /// URL that succeeded
        source: String,
        /// Position of the winning candidate
        index: usize,
        /// Bytes written
        size: u64,
    },
}

/// Fetches resources through the mirror fallback chain
#[derive(Debug, Clone)]
pub struct MirrorResolver {
    mirrors: MirrorSet,
    downloader: DownloadManager,
}

impl MirrorResolver {
    /// Create a resolver
    pub fn new(mirrors: MirrorSet, downloader: DownloadManager) -> Self {
        Self {
            mirrors,
            downloader,
        }
    }

    /// Fetch `url` into `dest`, falling back through mirrors
    ///
    /// If `dest` already exists no request is made.
    pub async fn resolve(&self, url: &str, dest: &Path) -> Result<ResolvedResource, DownloadError> {
        if dest.exists() {
            tracing::debug!("{} already present, skipping fetch", dest.display());
            return Ok(ResolvedResource::AlreadyPresent(dest.to_path_buf()));
        }

        let mut attempts = Vec::new();
        for (index, candidate) in self.mirrors.candidates(url).into_iter().enumerate() {
            tracing::debug!("Fetching {candidate}");
            match self.downloader.download(&candidate, dest).await {
                Ok(result) => {
                    if index > 0 {
                        tracing::info!("Fetched {} via mirror {candidate}", dest.display());
                    }
                    return Ok(ResolvedResource::Downloaded {
                        path: result.path,
                        source: candidate,
                        index,
                        size: result.size,
                    });
                }
                Err(e) => {
                    tracing::debug!("Candidate {candidate} failed: {e}");
                    attempts.push((candidate, e.to_string()));
                }
            }
        }

        tracing::warn!("All {} source(s) failed for {url}", attempts.len());
        Err(DownloadError::AllCandidatesFailed {
            url: url.to_string(),
            attempts,
        })
    }
}
