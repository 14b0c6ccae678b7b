//! Workload definitions
//!
//! The supported creative-AI workloads form a closed set; each carries
//! its own GPU tier, naming, plugin list, and model manifest as data
//! (see `catalog`).

pub mod catalog;
pub mod profile;

pub use catalog::profile;
pub use profile::{ModelSource, WorkloadProfile};

use crate::error::{ComfyPodError, ComfyPodResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported creative-AI workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workload {
    /// Audio generation with ACE-Step
    AceStep,
    /// Image generation with Flux
    Flux,
    /// Backend for the Krita generative-AI plugin
    Krita,
    /// Vision-language inference with Qwen2.5-VL
    Qwen,
    /// Image-to-video generation with Wan 2.1
    Wan,
}

impl Workload {
    /// All workloads, in catalog order
    pub fn all() -> &'static [Self] {
        &[Self::AceStep, Self::Flux, Self::Krita, Self::Qwen, Self::Wan]
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::AceStep => "Audio generation (ACE-Step v1 3.5B + Qwen3 lyrics)",
            Self::Flux => "Image generation (FLUX.1 schnell)",
            Self::Krita => "Krita generative-AI plugin backend (Illustrious XL)",
            Self::Qwen => "Vision-language inference (Qwen2.5-VL 32B)",
            Self::Wan => "Image-to-video live wallpapers (Wan 2.1 14B)",
        }
    }

    /// Comma-separated list of the known workload keys
    pub fn known_keys() -> String {
        Self::all()
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::AceStep => "ace-step",
            Self::Flux => "flux",
            Self::Krita => "krita",
            Self::Qwen => "qwen",
            Self::Wan => "wan",
        };
        write!(f, "{}", key)
    }
}

impl FromStr for Workload {
    type Err = ComfyPodError;

    fn from_str(s: &str) -> ComfyPodResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ace-step" => Ok(Self::AceStep),
            "flux" => Ok(Self::Flux),
            "krita" => Ok(Self::Krita),
            "qwen" => Ok(Self::Qwen),
            "wan" => Ok(Self::Wan),
            other => Err(ComfyPodError::UnknownWorkload {
                name: other.to_string(),
                known: Self::known_keys(),
            }),
        }
    }
}

/// GPU tier a workload is scheduled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpuTier {
    /// Entry-level inference GPU (16 GB)
    T4,
    /// 48 GB workstation GPU
    L40S,
    /// 80 GB datacenter GPU
    A100_80,
}

impl GpuTier {
    /// Device request passed to the container runtime
    pub fn device_request(&self) -> &'static str {
        // Podman CDI exposes all local GPUs; the tier itself is recorded
        // as a label for schedulers that understand it.
        "nvidia.com/gpu=all"
    }
}

impl fmt::Display for GpuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::T4 => "T4",
            Self::L40S => "L40S",
            Self::A100_80 => "A100-80GB",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_display_roundtrip() {
        for w in Workload::all() {
            let parsed: Workload = w.to_string().parse().unwrap();
            assert_eq!(parsed, *w);
        }
    }

    #[test]
    fn workload_parse_trims_and_lowercases() {
        let w: Workload = " Ace-Step ".parse().unwrap();
        assert_eq!(w, Workload::AceStep);
    }

    #[test]
    fn workload_parse_unknown() {
        let err = "sdxl".parse::<Workload>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sdxl"));
        assert!(msg.contains("ace-step"));
        assert!(msg.contains("wan"));
    }

    #[test]
    fn gpu_tier_display() {
        assert_eq!(GpuTier::T4.to_string(), "T4");
        assert_eq!(GpuTier::A100_80.to_string(), "A100-80GB");
    }
}
