//! HuggingFace hub downloads
//!
//! Single files and filtered repository snapshots, downloaded into the
//! shared cache through the hub client. `get` reuses anything already
//! cached; the force path re-downloads unconditionally.

use crate::error::{ComfyPodError, ComfyPodResult};
use hf_hub::api::tokio::{Api, ApiBuilder, ApiRepo};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Download one file from a HuggingFace repository into the cache
pub async fn download_hf_file(
    cache_dir: &Path,
    repo: &str,
    file: &str,
    token: Option<&str>,
    force: bool,
) -> ComfyPodResult<PathBuf> {
    info!("Downloading {}/{}", repo, file);

    let api = api_client(cache_dir, token)?;
    let repo_api = api.model(repo.to_string());

    fetch(&repo_api, repo, file, force).await
}

/// Download a filtered snapshot of a HuggingFace repository.
///
/// Lists the repository files, downloads every sibling matching the
/// allow patterns (all files when empty) and not matching the ignore
/// patterns, and returns the snapshot directory they share.
pub async fn download_hf_snapshot(
    cache_dir: &Path,
    repo: &str,
    allow: &[&str],
    ignore: &[&str],
    force: bool,
) -> ComfyPodResult<PathBuf> {
    info!("Downloading {}", repo);

    let api = api_client(cache_dir, None)?;
    let repo_api = api.model(repo.to_string());

    let repo_info = repo_api
        .info()
        .await
        .map_err(|e| hf_error(repo, "<repository info>", e))?;

    let mut snapshot_dir: Option<PathBuf> = None;
    for sibling in &repo_info.siblings {
        if !matches_patterns(&sibling.rfilename, allow, ignore) {
            debug!("Skipping {} (pattern filter)", sibling.rfilename);
            continue;
        }

        let cached = fetch(&repo_api, repo, &sibling.rfilename, force).await?;

        if snapshot_dir.is_none() {
            snapshot_dir = snapshot_root(&cached, &sibling.rfilename);
        }
    }

    snapshot_dir.ok_or_else(|| ComfyPodError::HfDownload {
        repo: repo.to_string(),
        file: "<snapshot>".to_string(),
        reason: "no repository files matched the snapshot patterns".to_string(),
    })
}

async fn fetch(repo_api: &ApiRepo, repo: &str, file: &str, force: bool) -> ComfyPodResult<PathBuf> {
    let result = if force {
        repo_api.download(file).await
    } else {
        repo_api.get(file).await
    };

    result.map_err(|e| hf_error(repo, file, e))
}

fn api_client(cache_dir: &Path, token: Option<&str>) -> ComfyPodResult<Api> {
    ApiBuilder::new()
        .with_cache_dir(cache_dir.to_path_buf())
        .with_token(token.map(str::to_string))
        .with_progress(false)
        .build()
        .map_err(|e| ComfyPodError::Internal(format!("HuggingFace API client: {}", e)))
}

fn hf_error(repo: &str, file: &str, e: hf_hub::api::tokio::ApiError) -> ComfyPodError {
    ComfyPodError::HfDownload {
        repo: repo.to_string(),
        file: file.to_string(),
        reason: e.to_string(),
    }
}

/// Whether a repository file passes the allow/ignore pattern filters.
///
/// An empty allow list admits every file. Patterns are shell globs
/// matched against the repository-relative filename.
fn matches_patterns(rfilename: &str, allow: &[&str], ignore: &[&str]) -> bool {
    let matches = |patterns: &[&str]| {
        patterns.iter().any(|p| {
            glob::Pattern::new(p)
                .map(|pat| pat.matches(rfilename))
                .unwrap_or(false)
        })
    };

    if !allow.is_empty() && !matches(allow) {
        return false;
    }
    !matches(ignore)
}

/// Recover the snapshot directory from a cached file path.
///
/// The hub cache stores files at `<snapshot>/<rfilename>`, so stripping
/// the rfilename's components off the cached path yields the snapshot
/// root shared by every file of the revision.
fn snapshot_root(cached: &Path, rfilename: &str) -> Option<PathBuf> {
    let depth = Path::new(rfilename).components().count();
    let mut root = cached;
    for _ in 0..depth {
        root = root.parent()?;
    }
    Some(root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_empty_allow_admits_all() {
        assert!(matches_patterns("config.json", &[], &[]));
        assert!(matches_patterns("weights.safetensors", &[], &[]));
    }

    #[test]
    fn patterns_allow_filters() {
        let allow = ["*.json", "*.safetensors"];
        assert!(matches_patterns("config.json", &allow, &[]));
        assert!(matches_patterns("model.safetensors", &allow, &[]));
        assert!(!matches_patterns("README.md", &allow, &[]));
    }

    #[test]
    fn patterns_allow_spans_subdirectories() {
        let allow = ["*.safetensors"];
        assert!(matches_patterns(
            "transformer/model-00001.safetensors",
            &allow,
            &[]
        ));
    }

    #[test]
    fn patterns_ignore_wins() {
        let allow = ["*.safetensors"];
        let ignore = ["*.fp16.safetensors"];
        assert!(matches_patterns("model.safetensors", &allow, &ignore));
        assert!(!matches_patterns("model.fp16.safetensors", &allow, &ignore));
    }

    #[test]
    fn snapshot_root_strips_flat_filename() {
        let cached = Path::new("/cache/models--org--repo/snapshots/abc123/config.json");
        assert_eq!(
            snapshot_root(cached, "config.json").unwrap(),
            Path::new("/cache/models--org--repo/snapshots/abc123")
        );
    }

    #[test]
    fn snapshot_root_strips_nested_filename() {
        let cached =
            Path::new("/cache/models--org--repo/snapshots/abc123/music_dcae/model.safetensors");
        assert_eq!(
            snapshot_root(cached, "music_dcae/model.safetensors").unwrap(),
            Path::new("/cache/models--org--repo/snapshots/abc123")
        );
    }
}
