//! Rootless Podman container runtime
//!
//! Implements the ContainerRuntime trait by driving the `podman` CLI
//! directly. Requires rootless Podman to be properly configured.

use crate::error::{ComfyPodError, ComfyPodResult};
use crate::orchestration::container::{RunSpec, VolumeInfo};
use crate::orchestration::runtime::ContainerRuntime;
use crate::orchestration::{build_error_output, stream_child_output};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Container runtime using rootless Podman
pub struct PodmanRuntime;

impl PodmanRuntime {
    /// Create a new Podman runtime
    pub fn new() -> Self {
        Self
    }

    /// Check if Podman is installed
    async fn podman_installed() -> bool {
        Command::new("podman")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Check if rootless Podman is properly configured
    async fn rootless_configured() -> ComfyPodResult<bool> {
        let output = Command::new("podman")
            .args(["info", "--format", "{{.Host.Security.Rootless}}"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ComfyPodError::command_failed("podman info", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim() == "true")
    }

    /// Execute a Podman command and return the output
    async fn exec(&self, args: &[&str]) -> ComfyPodResult<std::process::Output> {
        debug!("Executing: podman {:?}", args);

        Command::new("podman")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ComfyPodError::command_failed(format!("podman {:?}", args), e))
    }

    /// Execute a Podman command interactively
    async fn exec_interactive(&self, args: &[&str]) -> ComfyPodResult<i32> {
        debug!("Executing interactively: podman {:?}", args);

        let status = Command::new("podman")
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ComfyPodError::command_failed(format!("podman {:?}", args), e))?;

        Ok(status.code().unwrap_or(-1))
    }
}

impl Default for PodmanRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for PodmanRuntime {
    async fn is_available(&self) -> ComfyPodResult<bool> {
        if !Self::podman_installed().await {
            return Ok(false);
        }
        Self::rootless_configured().await
    }

    async fn ensure_ready(&self) -> ComfyPodResult<()> {
        if !Self::podman_installed().await {
            return Err(ComfyPodError::PodmanNotFound);
        }

        if !Self::rootless_configured().await? {
            return Err(ComfyPodError::PodmanRootlessSetup {
                reason: "Rootless Podman not configured. Run: podman system migrate".to_string(),
            });
        }

        Ok(())
    }

    async fn image_exists(&self, tag: &str) -> ComfyPodResult<bool> {
        let output = self.exec(&["image", "exists", tag]).await?;
        Ok(output.status.success())
    }

    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> ComfyPodResult<()> {
        info!("Building image {}", tag);

        let mut child = Command::new("podman")
            .args(["build", "--tag", tag])
            .arg(context_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ComfyPodError::command_failed("podman build", e))?;

        let all_output = stream_child_output(&mut child, on_output).await;

        let status = child
            .wait()
            .await
            .map_err(|e| ComfyPodError::command_failed("podman build", e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ComfyPodError::ImageBuild {
                tag: tag.to_string(),
                output: build_error_output(&all_output),
            })
        }
    }

    async fn volume_exists(&self, name: &str) -> ComfyPodResult<bool> {
        let output = self.exec(&["volume", "exists", name]).await?;
        Ok(output.status.success())
    }

    async fn volume_create(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> ComfyPodResult<()> {
        let mut args = vec!["volume".to_string(), "create".to_string()];

        // Sort for deterministic command lines
        let mut keys: Vec<&String> = labels.keys().collect();
        keys.sort();
        for key in keys {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, labels[key]));
        }
        args.push(name.to_string());

        let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.exec(&args_refs).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ComfyPodError::VolumeCreate {
                name: name.to_string(),
                reason: stderr.to_string(),
            })
        }
    }

    async fn volume_remove(&self, name: &str) -> ComfyPodResult<()> {
        let output = self.exec(&["volume", "rm", name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no such volume") {
                Ok(())
            } else {
                Err(ComfyPodError::command_exec("podman volume rm", stderr))
            }
        }
    }

    async fn volume_list(&self, label: &str) -> ComfyPodResult<Vec<VolumeInfo>> {
        let filter = format!("label={}", label);
        let output = self
            .exec(&["volume", "ls", "--filter", &filter, "--format", "json"])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ComfyPodError::command_exec("podman volume ls", stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(vec![]);
        }

        let volumes: Vec<VolumeInfo> = serde_json::from_str(stdout.trim())?;
        Ok(volumes)
    }

    async fn run(&self, spec: &RunSpec) -> ComfyPodResult<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            spec.name.clone(),
        ];

        for (host, container) in &spec.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", host, container));
        }

        for volume in &spec.volumes {
            args.push("-v".to_string());
            args.push(volume.clone());
        }

        let mut env_keys: Vec<&String> = spec.env.keys().collect();
        env_keys.sort();
        for key in env_keys {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, spec.env[key]));
        }

        if let Some(ref device) = spec.gpu_device {
            args.push("--device".to_string());
            args.push(device.clone());
            // CDI device injection conflicts with label confinement
            args.push("--security-opt=label=disable".to_string());
        }

        args.push(spec.image.clone());
        args.extend(spec.command.iter().cloned());

        debug!("Running container: podman {:?}", args);

        let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.exec(&args_refs).await?;

        if output.status.success() {
            let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
            info!(
                "Container started: {}",
                &container_id[..12.min(container_id.len())]
            );
            Ok(container_id)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ComfyPodError::ContainerStart(stderr.to_string()))
        }
    }

    async fn container_running(&self, name: &str) -> ComfyPodResult<Option<String>> {
        let filter = format!("name=^{}$", name);
        let output = self
            .exec(&["ps", "--filter", &filter, "--format", "{{.ID}}"])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let id = stdout.trim();
        if id.is_empty() {
            Ok(None)
        } else {
            Ok(Some(id.to_string()))
        }
    }

    async fn stop(&self, name: &str) -> ComfyPodResult<()> {
        debug!("Stopping container: {}", name);

        let output = self.exec(&["stop", name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ComfyPodError::command_exec("podman stop", stderr))
        }
    }

    async fn remove(&self, name: &str) -> ComfyPodResult<()> {
        debug!("Removing container: {}", name);

        let output = self.exec(&["rm", "-f", name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no such container") {
                Ok(())
            } else {
                Err(ComfyPodError::command_exec("podman rm", stderr))
            }
        }
    }

    async fn logs_follow(&self, name: &str) -> ComfyPodResult<()> {
        self.exec_interactive(&["logs", "-f", name]).await?;
        Ok(())
    }

    fn runtime_name(&self) -> &'static str {
        "Rootless Podman"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn podman_runtime_new() {
        let runtime = PodmanRuntime::new();
        assert_eq!(runtime.runtime_name(), "Rootless Podman");
    }

    #[test]
    fn podman_runtime_default() {
        let runtime = PodmanRuntime::default();
        assert_eq!(runtime.runtime_name(), "Rootless Podman");
    }
}
