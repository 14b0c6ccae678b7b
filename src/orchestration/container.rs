//! Shared container types
//!
//! Data structures used by container runtimes. The actual Podman
//! execution logic is in the runtime implementation.

use serde::Deserialize;
use std::collections::HashMap;

/// Configuration for starting a serve container
#[derive(Debug, Clone, Default)]
pub struct RunSpec {
    /// Container name (one per app; doubles as the instance lock)
    pub name: String,
    /// Image tag to run
    pub image: String,
    /// Volume mounts (source:container[:ro] format)
    pub volumes: Vec<String>,
    /// Environment variables
    pub env: HashMap<String, String>,
    /// Published ports (host, container)
    pub ports: Vec<(u16, u16)>,
    /// GPU device request (e.g. "nvidia.com/gpu=all")
    pub gpu_device: Option<String>,
    /// Command to run in the container
    pub command: Vec<String>,
}

/// Information about a named volume
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeInfo {
    /// Volume name
    #[serde(rename = "Name")]
    pub name: String,
    /// Volume labels
    #[serde(rename = "Labels", default)]
    pub labels: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_spec_default_is_empty() {
        let spec = RunSpec::default();
        assert!(spec.volumes.is_empty());
        assert!(spec.gpu_device.is_none());
    }

    #[test]
    fn volume_info_parses_podman_json() {
        let json = r#"[
            {"Name": "wan-comfyui-output",
             "Labels": {"io.comfypod.app": "wan-comfyui", "io.comfypod.managed": "true"}},
            {"Name": "unlabelled"}
        ]"#;

        let volumes: Vec<VolumeInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].name, "wan-comfyui-output");
        assert_eq!(
            volumes[0].labels.get("io.comfypod.app"),
            Some(&"wan-comfyui".to_string())
        );
        assert!(volumes[1].labels.is_empty());
    }
}
