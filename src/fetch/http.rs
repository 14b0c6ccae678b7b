//! Plain-URL downloads
//!
//! Fetches arbitrary URLs (Civitai, object stores) into the shared
//! cache. A file already present in the cache short-circuits the fetch
//! unless the force flag is set.

use crate::error::{ComfyPodError, ComfyPodResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Download a URL into `<cache_dir>/<file>`
pub async fn download_url_file(
    cache_dir: &Path,
    url: &str,
    file: &str,
    force: bool,
) -> ComfyPodResult<PathBuf> {
    let target = cache_dir.join(file);

    if target.exists() && !force {
        debug!("{} already cached, skipping fetch", file);
        return Ok(target);
    }

    info!("Downloading {}", redact_url(url));

    let url = url.to_string();
    let fetch_target = target.clone();
    tokio::task::spawn_blocking(move || fetch_to_file(&url, &fetch_target))
        .await
        .map_err(|e| ComfyPodError::Internal(format!("download task failed: {}", e)))??;

    Ok(target)
}

/// Stream the response body to a temp file, then rename into place so a
/// partial download never masquerades as a cached artifact.
fn fetch_to_file(url: &str, target: &Path) -> ComfyPodResult<()> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| ComfyPodError::UrlDownload {
            url: redact_url(url),
            reason: e.to_string(),
        })?;

    let partial = target.with_extension("part");
    let mut out = std::fs::File::create(&partial)
        .map_err(|e| ComfyPodError::io(format!("creating {}", partial.display()), e))?;

    let mut reader = response.into_body().into_reader();
    std::io::copy(&mut reader, &mut out).map_err(|e| ComfyPodError::UrlDownload {
        url: redact_url(url),
        reason: e.to_string(),
    })?;

    std::fs::rename(&partial, target)
        .map_err(|e| ComfyPodError::io(format!("moving {} into place", target.display()), e))?;

    Ok(())
}

/// Strip secret query parameters from a URL before it reaches logs or
/// error messages.
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.eq_ignore_ascii_case("token") => format!("{}=<redacted>", key),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", base, redacted.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn cached_file_skips_fetch() {
        let dir = TempDir::new().unwrap();
        let cached = dir.path().join("model.gguf");
        tokio::fs::write(&cached, b"weights").await.unwrap();

        // The URL is unreachable; success proves no fetch was attempted
        let path = download_url_file(dir.path(), "http://127.0.0.1:9/model", "model.gguf", false)
            .await
            .unwrap();

        assert_eq!(path, cached);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"weights");
    }

    #[tokio::test]
    async fn force_refetches_even_when_cached() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("model.gguf"), b"weights")
            .await
            .unwrap();

        let result =
            download_url_file(dir.path(), "http://127.0.0.1:9/model", "model.gguf", true).await;

        assert!(matches!(result, Err(ComfyPodError::UrlDownload { .. })));
    }

    #[test]
    fn redact_token_param() {
        let url = "https://civitai.com/api/download/models/480117?type=Model&token=secret123";
        let redacted = redact_url(url);
        assert!(!redacted.contains("secret123"));
        assert!(redacted.contains("token=<redacted>"));
        assert!(redacted.contains("type=Model"));
    }

    #[test]
    fn redact_leaves_plain_urls_alone() {
        let url = "https://example.com/file.pth";
        assert_eq!(redact_url(url), url);
    }
}
