//! Error types for ComfyPod
//!
//! All modules use `ComfyPodResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ComfyPod operations
pub type ComfyPodResult<T> = Result<T, ComfyPodError>;

/// All errors that can occur in ComfyPod
#[derive(Error, Debug)]
pub enum ComfyPodError {
    // Environment errors
    #[error("Podman not found. Install: sudo dnf install podman (or apt-get install podman)")]
    PodmanNotFound,

    #[error("Podman rootless setup incomplete: {reason}")]
    PodmanRootlessSetup { reason: String },

    #[error("Unsupported platform: {0}. ComfyPod supports Linux and macOS.")]
    UnsupportedPlatform(String),

    // Workload selection errors
    #[error("Unknown workload: {name}. Supported workloads: {known}")]
    UnknownWorkload { name: String, known: String },

    #[error("No workload selected. Set the APP environment variable or pass a workload argument.")]
    WorkloadNotSet,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Token errors
    #[error("Invalid tokens file {path}: {reason}")]
    TokensInvalid { path: PathBuf, reason: String },

    #[error("Token {name} not found in {searched}")]
    TokenMissing { name: String, searched: String },

    // Download errors
    #[error("HuggingFace download failed for {repo}/{file}: {reason}")]
    HfDownload {
        repo: String,
        file: String,
        reason: String,
    },

    #[error("Download failed for {url}: {reason}")]
    UrlDownload { url: String, reason: String },

    #[error("Failed to link {link}: {source}")]
    LinkCreate {
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Link target {path} exists and is not a symlink")]
    LinkCollision { path: PathBuf },

    // Build errors
    #[error("Image build failed for {tag}:\n{output}")]
    ImageBuild { tag: String, output: String },

    // Container errors
    #[error("Container failed to start: {0}")]
    ContainerStart(String),

    #[error("App {name} is already serving (container {container})")]
    AlreadyServing { name: String, container: String },

    #[error("ComfyUI did not become ready within {secs}s")]
    StartupTimeout { secs: u64 },

    // Volume errors
    #[error("Failed to create volume {name}: {reason}")]
    VolumeCreate { name: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ComfyPodError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::PodmanNotFound => Some("Install Podman: sudo dnf install podman"),
            Self::PodmanRootlessSetup { .. } => Some("Run: podman system migrate"),
            Self::WorkloadNotSet | Self::UnknownWorkload { .. } => {
                Some("Run: comfypod workloads to see what is available")
            }
            Self::TokenMissing { .. } => {
                Some("Add the token to tokens.json (a JSON map of name to secret)")
            }
            Self::AlreadyServing { .. } => Some("Stop it first: podman stop <container>"),
            Self::StartupTimeout { .. } => {
                Some("Inspect the container logs: podman logs <app-name>")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComfyPodError::PodmanNotFound;
        assert!(err.to_string().contains("Podman not found"));
    }

    #[test]
    fn error_hint() {
        let err = ComfyPodError::WorkloadNotSet;
        assert_eq!(
            err.hint(),
            Some("Run: comfypod workloads to see what is available")
        );
    }

    #[test]
    fn unknown_workload_lists_known() {
        let err = ComfyPodError::UnknownWorkload {
            name: "sdxl".to_string(),
            known: "ace-step, flux, krita, qwen, wan".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sdxl"));
        assert!(msg.contains("flux"));
    }
}
