//! Runtime factory
//!
//! Platform detection and runtime instantiation. Linux runs rootless
//! Podman natively; macOS runs it through `podman machine`.

use crate::error::{ComfyPodError, ComfyPodResult};
use crate::orchestration::podman::PodmanRuntime;
use crate::orchestration::runtime::ContainerRuntime;

/// Detected platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux - native rootless Podman
    Linux,
    /// macOS - Podman via podman machine
    MacOS,
    /// Unsupported platform
    Unsupported,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOS,
            _ => Platform::Unsupported,
        }
    }

    /// Get a human-readable platform name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::MacOS => "macOS",
            Platform::Unsupported => "Unsupported",
        }
    }
}

/// Create a container runtime appropriate for the current platform
pub fn create_runtime() -> ComfyPodResult<Box<dyn ContainerRuntime>> {
    match Platform::detect() {
        Platform::Linux | Platform::MacOS => Ok(Box::new(PodmanRuntime::new())),
        Platform::Unsupported => Err(ComfyPodError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        )),
    }
}
