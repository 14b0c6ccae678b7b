//! Workload profile data
//!
//! A profile is pure data: everything a workload adds on top of the
//! fixed build pipeline. Customization only ever appends to the base
//! steps, it never removes or reorders them.

use crate::workload::{GpuTier, Workload};
use std::path::{Path, PathBuf};

/// Everything the build pipeline needs to know about one workload
#[derive(Debug, Clone)]
pub struct WorkloadProfile {
    /// The workload this profile describes
    pub workload: Workload,

    /// GPU tier the app is scheduled on
    pub gpu: GpuTier,

    /// Application name (container and image naming)
    pub app_name: &'static str,

    /// Name of the persistent output volume
    pub output_volume: &'static str,

    /// Extra system packages on top of the base set
    pub system_packages: Vec<&'static str>,

    /// Extra python packages on top of the base set
    pub python_packages: Vec<&'static str>,

    /// Version pins applied after node install (node installs can drag
    /// in their own versions; the last install wins)
    pub post_install: Vec<&'static str>,

    /// ComfyUI custom nodes installed via comfy-cli
    pub nodes: Vec<&'static str>,

    /// Model weights to download and link into the model tree
    pub models: Vec<ModelSource>,
}

impl WorkloadProfile {
    /// Model sources destined for a given model-tree subdirectory
    pub fn models_for(&self, dest: &str) -> Vec<&ModelSource> {
        self.models.iter().filter(|m| m.dest() == dest).collect()
    }
}

/// One remote model artifact and where it links into the model tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A single file from a HuggingFace repository
    HfFile {
        /// Repository id, e.g. "Comfy-Org/Wan_2.1_ComfyUI_repackaged"
        repo: &'static str,
        /// Path of the file inside the repository
        file: &'static str,
        /// Model-root-relative destination directory
        dest: &'static str,
        /// Link name; defaults to the repository file path
        save_as: Option<&'static str>,
        /// Name of the token required for gated repositories
        token: Option<&'static str>,
    },

    /// A filtered snapshot of a HuggingFace repository, linked as a directory
    HfSnapshot {
        repo: &'static str,
        /// Name of the directory link created under `dest`
        link_name: &'static str,
        dest: &'static str,
        /// Only files matching these patterns are downloaded (empty = all)
        allow: &'static [&'static str],
        /// Files matching these patterns are skipped
        ignore: &'static [&'static str],
    },

    /// A plain URL fetched over HTTP
    Url {
        url: &'static str,
        /// Filename used in the cache and for the link
        file: &'static str,
        dest: &'static str,
        /// Query parameter and token name appended for authenticated hosts
        token_query: Option<(&'static str, &'static str)>,
    },
}

impl ModelSource {
    /// Model-root-relative destination directory
    pub fn dest(&self) -> &'static str {
        match self {
            Self::HfFile { dest, .. }
            | Self::HfSnapshot { dest, .. }
            | Self::Url { dest, .. } => dest,
        }
    }

    /// Name of the link created under the destination directory
    pub fn link_name(&self) -> &'static str {
        match self {
            Self::HfFile { file, save_as, .. } => save_as.unwrap_or(file),
            Self::HfSnapshot { link_name, .. } => link_name,
            Self::Url { file, .. } => file,
        }
    }

    /// Full link path under a model root
    pub fn link_path(&self, models_root: &Path) -> PathBuf {
        models_root.join(self.dest()).join(self.link_name())
    }

    /// Short description for progress output
    pub fn describe(&self) -> String {
        match self {
            Self::HfFile { repo, file, .. } => format!("{}/{}", repo, file),
            Self::HfSnapshot { repo, .. } => repo.to_string(),
            Self::Url { file, .. } => file.to_string(),
        }
    }
}
