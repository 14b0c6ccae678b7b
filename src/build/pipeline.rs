//! The build pipeline
//!
//! A fixed, strictly ordered sequence of stages turns a workload
//! profile into an image recipe and a mount plan. Workload data only
//! ever appends to the base stages (extra packages, extra nodes, extra
//! models); it cannot remove or reorder them.

use crate::build::recipe::ImageRecipe;
use crate::config::schema::{ContainerConfig, DownloadConfig};
use crate::workload::{GpuTier, Workload, WorkloadProfile};
use std::fmt;
use std::path::{Path, PathBuf};

/// System packages every workload image gets.
/// git for ComfyUI cloning, wget for direct-URL model fetches inside
/// the container.
pub const BASE_SYSTEM_PACKAGES: &[&str] = &["git", "wget"];

/// Python packages every workload image gets: the web stack, comfy-cli,
/// and the hub client with hf_transfer acceleration.
pub const BASE_PYTHON_PACKAGES: &[&str] = &[
    "fastapi[standard]==0.115.4",
    "comfy-cli",
    "huggingface_hub[hf_transfer]",
];

/// comfy-cli installs ComfyUI and its dependencies
const COMFY_INSTALL: &str = "comfy --skip-prompt install --fast-deps --nvidia";

/// Pipeline stages, in the only order they ever run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    BaseImage,
    SystemPackages,
    ComfyInstall,
    Nodes,
    PostInstall,
    CopyFiles,
    ModelDownload,
    OutputVolume,
}

impl BuildStage {
    /// All stages in execution order
    pub fn all() -> &'static [Self] {
        &[
            Self::BaseImage,
            Self::SystemPackages,
            Self::ComfyInstall,
            Self::Nodes,
            Self::PostInstall,
            Self::CopyFiles,
            Self::ModelDownload,
            Self::OutputVolume,
        ]
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BaseImage => "base image",
            Self::SystemPackages => "system packages",
            Self::ComfyInstall => "ComfyUI install",
            Self::Nodes => "custom nodes",
            Self::PostInstall => "post-install pins",
            Self::CopyFiles => "file copy-in",
            Self::ModelDownload => "model download",
            Self::OutputVolume => "output volume",
        };
        write!(f, "{}", label)
    }
}

/// Compose the image recipe for a workload.
///
/// Base packages come first and workload extras are appended, so every
/// workload image is a strict superset of the base image.
pub fn compose_recipe(
    profile: &WorkloadProfile,
    container: &ContainerConfig,
    download: &DownloadConfig,
) -> ImageRecipe {
    let mut recipe = ImageRecipe::from_base(&container.base_image);

    // system packages: base, then workload extras
    let mut packages: Vec<&str> = BASE_SYSTEM_PACKAGES.to_vec();
    packages.extend(&profile.system_packages);
    recipe = recipe.apt_install(&packages);

    // python packages: base, then workload extras
    let mut python: Vec<&str> = BASE_PYTHON_PACKAGES.to_vec();
    python.extend(&profile.python_packages);
    recipe = recipe.pip_install(&python);

    recipe = recipe.run_commands(&[COMFY_INSTALL]);

    // custom nodes, one command each
    let node_commands: Vec<String> = profile
        .nodes
        .iter()
        .map(|node| format!("comfy node install --fast-deps {}", node))
        .collect();
    recipe = recipe.run_commands(&node_commands);

    // version pins that must land after node installs
    if !profile.post_install.is_empty() {
        recipe = recipe.pip_install(&profile.post_install);
    }

    // local files baked into the image
    for (src, dest) in &container.copy_files {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| src.display().to_string());
        recipe = recipe.copy(name, dest.clone());
    }

    if download.hf_transfer {
        recipe = recipe.env("HF_HUB_ENABLE_HF_TRANSFER", "1");
    }

    // the output directory must be empty for the volume mount to work
    recipe = recipe.run_commands(&[format!("rm -rf {}", container.output_dir())]);

    recipe
}

/// Where a mount comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// A named runtime volume
    Named(String),
    /// A host directory bind mount
    HostPath(PathBuf),
}

/// One mount in the serve container
#[derive(Debug, Clone)]
pub struct VolumeMount {
    pub source: VolumeSource,
    pub container_path: String,
    pub readonly: bool,
}

impl VolumeMount {
    /// Render the runtime volume argument
    pub fn volume_arg(&self) -> String {
        let source = match &self.source {
            VolumeSource::Named(name) => name.clone(),
            VolumeSource::HostPath(path) => path.display().to_string(),
        };
        let ro = if self.readonly { ":ro" } else { "" };
        format!("{}:{}{}", source, self.container_path, ro)
    }
}

/// The mount plan for a workload: shared cache at its own host path (so
/// symlinks resolve identically on both sides), the model tree at the
/// ComfyUI models directory, and the output volume at the output
/// directory.
pub fn mount_plan(
    profile: &WorkloadProfile,
    container: &ContainerConfig,
    cache_dir: &Path,
    models_root: &Path,
) -> Vec<VolumeMount> {
    vec![
        VolumeMount {
            source: VolumeSource::HostPath(cache_dir.to_path_buf()),
            container_path: cache_dir.display().to_string(),
            readonly: false,
        },
        VolumeMount {
            source: VolumeSource::HostPath(models_root.to_path_buf()),
            container_path: container.models_dir(),
            readonly: false,
        },
        VolumeMount {
            source: VolumeSource::Named(profile.output_volume.to_string()),
            container_path: container.output_dir(),
            readonly: false,
        },
    ]
}

/// A fully built app, ready to serve
#[derive(Debug, Clone)]
pub struct BuiltApp {
    pub workload: Workload,
    pub app_name: String,
    pub image_tag: String,
    pub gpu: GpuTier,
    pub output_volume: String,
    pub volumes: Vec<VolumeMount>,
}

impl BuiltApp {
    /// The two operator hints for retrieving and deleting generations
    pub fn output_volume_hints(&self) -> [String; 2] {
        [
            format!(
                "`podman volume export {} --output generations.tar` to download output generations",
                self.output_volume
            ),
            format!(
                "`podman volume rm {}` to delete the output volume",
                self.output_volume
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::recipe::Instruction;
    use crate::workload::{catalog, Workload};

    fn defaults() -> (ContainerConfig, DownloadConfig) {
        (ContainerConfig::default(), DownloadConfig::default())
    }

    #[test]
    fn base_packages_prefix_every_workload() {
        let (container, download) = defaults();

        for w in Workload::all() {
            let profile = catalog::profile(*w);
            let recipe = compose_recipe(&profile, &container, &download);

            let apt = recipe
                .instructions()
                .iter()
                .find_map(|i| match i {
                    Instruction::Apt(pkgs) => Some(pkgs.clone()),
                    _ => None,
                })
                .expect("every recipe installs system packages");
            assert!(
                apt.starts_with(&["git".to_string(), "wget".to_string()]),
                "{}: base packages must come first, got {:?}",
                w,
                apt
            );

            let pip = recipe
                .instructions()
                .iter()
                .find_map(|i| match i {
                    Instruction::Pip(pkgs) => Some(pkgs.clone()),
                    _ => None,
                })
                .expect("every recipe installs python packages");
            assert_eq!(&pip[..BASE_PYTHON_PACKAGES.len()], BASE_PYTHON_PACKAGES);
        }
    }

    #[test]
    fn ace_step_appends_audio_stack() {
        let (container, download) = defaults();
        let profile = catalog::profile(Workload::AceStep);
        let dockerfile = compose_recipe(&profile, &container, &download).dockerfile();

        assert!(dockerfile.contains("git wget sox ffmpeg libportaudio2"));
        assert!(dockerfile.contains("comfy node install --fast-deps ace-step"));
        // pin lands after the node installs
        let node = dockerfile.find("comfy node install").unwrap();
        let pin = dockerfile.find("numpy==2.2").unwrap();
        assert!(node < pin);
    }

    #[test]
    fn flux_has_no_nodes_but_keeps_base_stages() {
        let (container, download) = defaults();
        let profile = catalog::profile(Workload::Flux);
        let dockerfile = compose_recipe(&profile, &container, &download).dockerfile();

        assert!(!dockerfile.contains("comfy node install"));
        assert!(dockerfile.contains("comfy --skip-prompt install --fast-deps --nvidia"));
        assert!(dockerfile.contains("ENV HF_HUB_ENABLE_HF_TRANSFER=1"));
        assert!(dockerfile.contains("rm -rf /root/comfy/ComfyUI/output"));
    }

    #[test]
    fn comfy_install_precedes_node_installs() {
        let (container, download) = defaults();
        let profile = catalog::profile(Workload::Wan);
        let dockerfile = compose_recipe(&profile, &container, &download).dockerfile();

        let install = dockerfile.find("comfy --skip-prompt install").unwrap();
        let nodes = dockerfile.find("comfy node install").unwrap();
        assert!(install < nodes);
    }

    #[test]
    fn stage_order_is_fixed() {
        let stages = BuildStage::all();
        assert_eq!(stages.first(), Some(&BuildStage::BaseImage));
        assert_eq!(stages.last(), Some(&BuildStage::OutputVolume));
        let model_idx = stages
            .iter()
            .position(|s| *s == BuildStage::ModelDownload)
            .unwrap();
        let copy_idx = stages
            .iter()
            .position(|s| *s == BuildStage::CopyFiles)
            .unwrap();
        assert!(copy_idx < model_idx);
    }

    #[test]
    fn mount_plan_covers_cache_models_output() {
        let (container, _) = defaults();
        let profile = catalog::profile(Workload::Wan);
        let mounts = mount_plan(
            &profile,
            &container,
            Path::new("/home/u/.local/share/comfypod/hf-cache"),
            Path::new("/home/u/.local/share/comfypod/models/wan"),
        );

        assert_eq!(mounts.len(), 3);
        // cache mounts at its own absolute path so links resolve inside
        assert_eq!(
            mounts[0].volume_arg(),
            "/home/u/.local/share/comfypod/hf-cache:/home/u/.local/share/comfypod/hf-cache"
        );
        assert_eq!(
            mounts[1].container_path,
            "/root/comfy/ComfyUI/models"
        );
        assert_eq!(
            mounts[2].source,
            VolumeSource::Named("wan-comfyui-output".to_string())
        );
        assert_eq!(mounts[2].container_path, "/root/comfy/ComfyUI/output");
    }

    #[test]
    fn output_volume_hints_name_the_volume() {
        let profile = catalog::profile(Workload::Flux);
        let app = BuiltApp {
            workload: Workload::Flux,
            app_name: profile.app_name.to_string(),
            image_tag: "flux-comfyui-abc123def456".to_string(),
            gpu: profile.gpu,
            output_volume: profile.output_volume.to_string(),
            volumes: vec![],
        };

        let [get_hint, rm_hint] = app.output_volume_hints();
        assert!(get_hint.contains("volume export flux-comfyui-output"));
        assert!(rm_hint.contains("volume rm flux-comfyui-output"));
    }
}
