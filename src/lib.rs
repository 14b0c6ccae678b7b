//! ComfyPod - ComfyUI workload deployment
//!
//! Builds container images, provisions model and output storage, and
//! serves ComfyUI creative-AI workloads in rootless containers.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestration;
pub mod tokens;
pub mod ui;
pub mod workload;

pub use error::{ComfyPodError, ComfyPodResult};
