//! App building
//!
//! Runs the full pipeline for a workload: compose the image recipe,
//! build the image if its content-addressed tag is absent, sync the
//! model manifest into the shared cache, and provision the labelled
//! output volume.

pub mod downloads;
pub mod pipeline;
pub mod recipe;

pub use downloads::{sync_models, DownloadSummary};
pub use pipeline::{compose_recipe, mount_plan, BuildStage, BuiltApp, VolumeMount, VolumeSource};
pub use recipe::ImageRecipe;

use crate::config::{Config, ConfigManager};
use crate::error::{ComfyPodError, ComfyPodResult};
use crate::fetch::HubFetcher;
use crate::orchestration::ContainerRuntime;
use crate::tokens::TokenStore;
use crate::workload::{catalog, Workload};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Volume label keys used to track comfypod volumes
pub mod labels {
    /// Marks a volume as comfypod-managed
    pub const MANAGED: &str = "io.comfypod.managed";
    /// The app the volume belongs to
    pub const APP: &str = "io.comfypod.app";
    /// The workload key
    pub const WORKLOAD: &str = "io.comfypod.workload";
    /// GPU tier the app is scheduled on
    pub const GPU: &str = "io.comfypod.gpu";
    /// Creation timestamp (RFC3339)
    pub const CREATED_AT: &str = "io.comfypod.created_at";
}

/// Build everything a workload needs to serve.
///
/// `on_build_line` receives raw build output lines for progress display.
pub async fn build_app(
    runtime: &dyn ContainerRuntime,
    config: &Config,
    workload: Workload,
    tokens: &TokenStore,
    redownload_models: bool,
    on_build_line: &(dyn Fn(String) + Send + Sync),
) -> ComfyPodResult<BuiltApp> {
    let profile = catalog::profile(workload);
    debug!(
        "Pipeline: {}",
        BuildStage::all()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Image: content-addressed, so an unchanged recipe never rebuilds
    let recipe = compose_recipe(&profile, &config.container, &config.download);
    let image_tag = recipe.tag(profile.app_name);

    if runtime.image_exists(&image_tag).await? {
        debug!("Image already built: {}", image_tag);
    } else {
        let build_dir = prepare_build_dir(&recipe, &config.container.copy_files).await?;

        let result = runtime
            .build_image(&build_dir, &image_tag, on_build_line)
            .await;

        // Clean up build directory (best-effort)
        let _ = tokio::fs::remove_dir_all(&build_dir).await;

        result?;
        info!("Image built: {}", image_tag);
    }

    // Models: download into the shared cache, link into the model tree
    let cache_dir = ConfigManager::cache_dir();
    let models_root = ConfigManager::models_dir(workload);
    let fetcher = HubFetcher::new(&cache_dir, redownload_models);
    let summary = sync_models(&profile, &models_root, &fetcher, tokens).await?;
    debug!("{} model link(s) synced", summary.linked);

    // Output volume: created once, reused across builds
    if !runtime.volume_exists(profile.output_volume).await? {
        runtime
            .volume_create(profile.output_volume, &output_volume_labels(&profile))
            .await?;
        info!("Created output volume {}", profile.output_volume);
    }

    let volumes = mount_plan(&profile, &config.container, &cache_dir, &models_root);

    Ok(BuiltApp {
        workload,
        app_name: profile.app_name.to_string(),
        image_tag,
        gpu: profile.gpu,
        output_volume: profile.output_volume.to_string(),
        volumes,
    })
}

/// Labels attached to a workload's output volume
fn output_volume_labels(profile: &crate::workload::WorkloadProfile) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(labels::MANAGED.to_string(), "true".to_string());
    labels.insert(labels::APP.to_string(), profile.app_name.to_string());
    labels.insert(
        labels::WORKLOAD.to_string(),
        profile.workload.to_string(),
    );
    labels.insert(labels::GPU.to_string(), profile.gpu.to_string());
    labels.insert(
        labels::CREATED_AT.to_string(),
        Utc::now().to_rfc3339(),
    );
    labels
}

/// Write a unique build context: the Dockerfile plus any copy-in files.
async fn prepare_build_dir(
    recipe: &ImageRecipe,
    copy_files: &[(PathBuf, String)],
) -> ComfyPodResult<PathBuf> {
    let builds_dir = ConfigManager::builds_dir();
    tokio::fs::create_dir_all(&builds_dir)
        .await
        .map_err(|e| ComfyPodError::io("creating builds directory", e))?;

    let build_id = uuid::Uuid::new_v4().to_string();
    let build_dir = builds_dir.join(&build_id);
    tokio::fs::create_dir_all(&build_dir)
        .await
        .map_err(|e| ComfyPodError::io("creating build directory", e))?;

    for (src, _) in copy_files {
        if !src.exists() {
            return Err(ComfyPodError::PathNotFound(src.clone()));
        }
        let name = src
            .file_name()
            .ok_or_else(|| ComfyPodError::PathNotFound(src.clone()))?;
        tokio::fs::copy(src, build_dir.join(name))
            .await
            .map_err(|e| ComfyPodError::io(format!("copying {}", src.display()), e))?;
    }

    tokio::fs::write(build_dir.join("Dockerfile"), recipe.dockerfile())
        .await
        .map_err(|e| ComfyPodError::io("writing Dockerfile", e))?;

    Ok(build_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::catalog;

    #[test]
    fn output_volume_labels_carry_identity() {
        let profile = catalog::profile(Workload::Wan);
        let labels_map = output_volume_labels(&profile);

        assert_eq!(labels_map.get(labels::MANAGED), Some(&"true".to_string()));
        assert_eq!(
            labels_map.get(labels::APP),
            Some(&"wan-comfyui".to_string())
        );
        assert_eq!(labels_map.get(labels::WORKLOAD), Some(&"wan".to_string()));
        assert_eq!(labels_map.get(labels::GPU), Some(&"L40S".to_string()));
        assert!(labels_map.contains_key(labels::CREATED_AT));
    }

    #[tokio::test]
    async fn prepare_build_dir_missing_copy_source_errors() {
        let recipe = ImageRecipe::from_base("python:3.11-slim");
        let copy = vec![(
            PathBuf::from("/no/such/workflow.json"),
            "/root/workflow.json".to_string(),
        )];

        let result = prepare_build_dir(&recipe, &copy).await;
        assert!(matches!(result, Err(ComfyPodError::PathNotFound(_))));
    }
}
