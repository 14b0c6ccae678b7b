//! Container runtime abstraction
//!
//! Provides a trait for the container operations the build and serve
//! flows need, so they can be driven against a mock in tests.

use crate::error::ComfyPodResult;
use crate::orchestration::container::{RunSpec, VolumeInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Abstract container runtime interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Check if the runtime is available on this system
    async fn is_available(&self) -> ComfyPodResult<bool>;

    /// Ensure the runtime is ready (installed, rootless configured)
    async fn ensure_ready(&self) -> ComfyPodResult<()>;

    /// Check if an image exists locally
    async fn image_exists(&self, tag: &str) -> ComfyPodResult<bool>;

    /// Build an image from a context directory containing a Dockerfile,
    /// streaming raw output lines to `on_output`
    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> ComfyPodResult<()>;

    /// Check if a named volume exists
    async fn volume_exists(&self, name: &str) -> ComfyPodResult<bool>;

    /// Create a named volume with labels
    async fn volume_create(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> ComfyPodResult<()>;

    /// Remove a named volume
    async fn volume_remove(&self, name: &str) -> ComfyPodResult<()>;

    /// List volumes carrying the given label
    async fn volume_list(&self, label: &str) -> ComfyPodResult<Vec<VolumeInfo>>;

    /// Start a detached container and return its ID
    async fn run(&self, spec: &RunSpec) -> ComfyPodResult<String>;

    /// ID of the running container with this name, if any
    async fn container_running(&self, name: &str) -> ComfyPodResult<Option<String>>;

    /// Stop a container gracefully
    async fn stop(&self, name: &str) -> ComfyPodResult<()>;

    /// Remove a container
    async fn remove(&self, name: &str) -> ComfyPodResult<()>;

    /// Follow container logs interactively
    async fn logs_follow(&self, name: &str) -> ComfyPodResult<()>;

    /// Get the human-readable runtime name for display
    fn runtime_name(&self) -> &'static str;
}
