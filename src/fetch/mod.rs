//! Model artifact fetching
//!
//! Downloads land in a shared cache directory; the model tree only ever
//! holds symlinks into that cache. The `ModelFetcher` trait is the seam
//! to the external download collaborators (the HuggingFace hub and
//! plain HTTP hosts), so the sync logic can be exercised without the
//! network.

pub mod hf;
pub mod http;
pub mod link;

pub use link::{find_broken_links, place_link};

use crate::error::ComfyPodResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fetches model artifacts into the shared cache, returning the cached path
#[async_trait]
pub trait ModelFetcher: Send + Sync {
    /// Fetch a single file from a HuggingFace repository
    async fn hf_file(&self, repo: &str, file: &str, token: Option<&str>)
        -> ComfyPodResult<PathBuf>;

    /// Fetch a filtered repository snapshot; returns the snapshot directory
    async fn hf_snapshot(
        &self,
        repo: &str,
        allow: &[&str],
        ignore: &[&str],
    ) -> ComfyPodResult<PathBuf>;

    /// Fetch a plain URL into the cache under `file`
    async fn url_file(&self, url: &str, file: &str) -> ComfyPodResult<PathBuf>;
}

/// Real fetcher backed by the HuggingFace hub and plain HTTP
pub struct HubFetcher {
    cache_dir: PathBuf,
    force: bool,
}

impl HubFetcher {
    /// Create a fetcher over the given cache directory.
    ///
    /// With `force`, every fetch bypasses the cache and re-downloads;
    /// without it, cached artifacts are reused.
    pub fn new(cache_dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            force,
        }
    }

    /// The cache directory this fetcher downloads into
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[async_trait]
impl ModelFetcher for HubFetcher {
    async fn hf_file(
        &self,
        repo: &str,
        file: &str,
        token: Option<&str>,
    ) -> ComfyPodResult<PathBuf> {
        hf::download_hf_file(&self.cache_dir, repo, file, token, self.force).await
    }

    async fn hf_snapshot(
        &self,
        repo: &str,
        allow: &[&str],
        ignore: &[&str],
    ) -> ComfyPodResult<PathBuf> {
        hf::download_hf_snapshot(&self.cache_dir, repo, allow, ignore, self.force).await
    }

    async fn url_file(&self, url: &str, file: &str) -> ComfyPodResult<PathBuf> {
        http::download_url_file(&self.cache_dir, url, file, self.force).await
    }
}
