//! Configuration schema for ComfyPod
//!
//! Configuration is stored at `~/.config/comfypod/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container image settings
    pub container: ContainerConfig,

    /// Serving settings
    pub serve: ServeConfig,

    /// Model download settings
    pub download: DownloadConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Container image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Base image the pipeline builds on
    pub base_image: String,

    /// ComfyUI install directory inside the container
    pub comfy_dir: String,

    /// Local files to bake into the image (host path, container path)
    pub copy_files: Vec<(PathBuf, String)>,
}

impl ContainerConfig {
    /// ComfyUI model directory inside the container
    pub fn models_dir(&self) -> String {
        format!("{}/models", self.comfy_dir)
    }

    /// ComfyUI output directory inside the container
    pub fn output_dir(&self) -> String {
        format!("{}/output", self.comfy_dir)
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            base_image: "docker.io/library/python:3.11-slim".to_string(),
            comfy_dir: "/root/comfy/ComfyUI".to_string(),
            copy_files: vec![],
        }
    }
}

/// Serving configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Host port the ComfyUI web UI is published on
    pub port: u16,

    /// Maximum container instances per app (the UI is a single
    /// interactive session, so this stays at 1)
    pub max_containers: u32,

    /// Concurrent inbound requests the UI is allowed; the startup
    /// sequence fires several API calls at once. Exported to the
    /// container as COMFYPOD_CONCURRENT_INPUTS for a fronting proxy.
    pub concurrent_inputs: u32,

    /// Seconds to wait for the UI port to accept connections
    pub startup_timeout_secs: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            max_containers: 1,
            concurrent_inputs: 10,
            startup_timeout_secs: 60,
        }
    }
}

/// Model download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Enable hf_transfer acceleration inside the image
    pub hf_transfer: bool,

    /// Override the tokens file location (defaults to ./tokens.json,
    /// then ~/.config/comfypod/tokens.json)
    pub tokens_file: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            hf_transfer: true,
            tokens_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[serve]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.serve.port, 8000);
        assert_eq!(config.serve.max_containers, 1);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [serve]
            port = 8188
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.serve.port, 8188);
        // defaults preserved
        assert_eq!(config.container.comfy_dir, "/root/comfy/ComfyUI");
        assert_eq!(config.serve.startup_timeout_secs, 60);
    }

    #[test]
    fn container_paths_derive_from_comfy_dir() {
        let container = ContainerConfig::default();
        assert_eq!(container.models_dir(), "/root/comfy/ComfyUI/models");
        assert_eq!(container.output_dir(), "/root/comfy/ComfyUI/output");
    }
}
