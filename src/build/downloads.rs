//! Model synchronization
//!
//! Drives a workload's model manifest through a fetcher: every artifact
//! is downloaded into the shared cache and linked from its place in the
//! model tree. Failures abort the sync; whatever was already cached
//! stays cached.

use crate::error::{ComfyPodError, ComfyPodResult};
use crate::fetch::{place_link, ModelFetcher};
use crate::tokens::TokenStore;
use crate::workload::{ModelSource, WorkloadProfile};
use std::path::Path;
use tracing::{debug, info};

/// What a sync did
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadSummary {
    /// Links now present in the model tree
    pub linked: usize,
}

/// Download and link every model the workload declares.
pub async fn sync_models(
    profile: &WorkloadProfile,
    models_root: &Path,
    fetcher: &dyn ModelFetcher,
    tokens: &TokenStore,
) -> ComfyPodResult<DownloadSummary> {
    let mut summary = DownloadSummary::default();

    for source in &profile.models {
        let dest_dir = models_root.join(source.dest());
        tokio::fs::create_dir_all(&dest_dir).await.map_err(|e| {
            ComfyPodError::io(format!("creating model directory {}", dest_dir.display()), e)
        })?;

        debug!("Syncing {}", source.describe());
        let cached = fetch_source(source, fetcher, tokens).await?;

        place_link(&cached, &source.link_path(models_root))?;
        summary.linked += 1;
    }

    info!(
        "{}: {} model link(s) in place",
        profile.app_name, summary.linked
    );
    Ok(summary)
}

async fn fetch_source(
    source: &ModelSource,
    fetcher: &dyn ModelFetcher,
    tokens: &TokenStore,
) -> ComfyPodResult<std::path::PathBuf> {
    match source {
        ModelSource::HfFile {
            repo, file, token, ..
        } => {
            let token = token.map(|name| tokens.require(name)).transpose()?;
            fetcher.hf_file(repo, file, token).await
        }
        ModelSource::HfSnapshot {
            repo,
            allow,
            ignore,
            ..
        } => fetcher.hf_snapshot(repo, allow, ignore).await,
        ModelSource::Url {
            url,
            file,
            token_query,
            ..
        } => {
            let url = match token_query {
                Some((param, name)) => {
                    let token = tokens.require(name)?;
                    let sep = if url.contains('?') { '&' } else { '?' };
                    format!("{}{}{}={}", url, sep, param, token)
                }
                None => (*url).to_string(),
            };
            fetcher.url_file(&url, file).await
        }
    }
}
