//! Image recipes
//!
//! An `ImageRecipe` is an ordered instruction list with value
//! semantics: each pipeline step consumes the recipe and returns a new
//! one with its instructions appended. The rendered Dockerfile gives
//! every step its own instruction for build-cache granularity, and the
//! image tag is a content-addressed hash of the rendered output, so an
//! unchanged recipe never rebuilds.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// One pipeline instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// System packages installed via apt
    Apt(Vec<String>),
    /// Python packages installed via pip
    Pip(Vec<String>),
    /// A shell command
    Run(String),
    /// An environment variable baked into the image
    Env(String, String),
    /// A file copied from the build context
    Copy { src: String, dest: String },
}

/// An ordered, immutable-per-step description of container contents
#[derive(Debug, Clone)]
pub struct ImageRecipe {
    base: String,
    instructions: Vec<Instruction>,
}

impl ImageRecipe {
    /// Start a recipe from a base image
    pub fn from_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            instructions: Vec::new(),
        }
    }

    /// Install system packages
    pub fn apt_install<S: AsRef<str>>(mut self, packages: &[S]) -> Self {
        self.instructions.push(Instruction::Apt(
            packages.iter().map(|p| p.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Install python packages
    pub fn pip_install<S: AsRef<str>>(mut self, packages: &[S]) -> Self {
        self.instructions.push(Instruction::Pip(
            packages.iter().map(|p| p.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Run shell commands, one instruction each
    pub fn run_commands<S: AsRef<str>>(mut self, commands: &[S]) -> Self {
        for cmd in commands {
            self.instructions
                .push(Instruction::Run(cmd.as_ref().to_string()));
        }
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.instructions
            .push(Instruction::Env(key.into(), value.into()));
        self
    }

    /// Copy a file from the build context into the image
    pub fn copy(mut self, src: impl Into<String>, dest: impl Into<String>) -> Self {
        self.instructions.push(Instruction::Copy {
            src: src.into(),
            dest: dest.into(),
        });
        self
    }

    /// The base image this recipe builds on
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The ordered instruction list
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Files the build context must contain (sources of Copy instructions)
    pub fn context_files(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Copy { src, .. } => Some(src.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render the Dockerfile
    pub fn dockerfile(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "FROM {}", self.base);
        out.push('\n');

        for instruction in &self.instructions {
            match instruction {
                Instruction::Apt(packages) => {
                    let _ = writeln!(
                        out,
                        "RUN apt-get update && apt-get install -y --no-install-recommends {} \\\n    && rm -rf /var/lib/apt/lists/*",
                        packages.join(" ")
                    );
                }
                Instruction::Pip(packages) => {
                    let quoted: Vec<String> =
                        packages.iter().map(|p| shell_quote(p)).collect();
                    let _ = writeln!(
                        out,
                        "RUN pip install --no-cache-dir {}",
                        quoted.join(" ")
                    );
                }
                Instruction::Run(cmd) => {
                    let _ = writeln!(out, "RUN {}", cmd);
                }
                Instruction::Env(key, value) => {
                    let _ = writeln!(out, "ENV {}={}", key, env_quote(value));
                }
                Instruction::Copy { src, dest } => {
                    let _ = writeln!(out, "COPY {} {}", src, dest);
                }
            }
        }

        out
    }

    /// Content-addressed image tag: `<app>-<sha256 of dockerfile, 12 hex>`
    pub fn tag(&self, app_name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.dockerfile().as_bytes());
        let hash = hex::encode(hasher.finalize());
        format!("{}-{}", app_name, &hash[..12])
    }
}

/// Quote a package spec for a shell command line.
/// `fastapi[standard]==0.115.4` would glob-expand unquoted.
fn shell_quote(value: &str) -> String {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '=' | '/' | ':' | '+'))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Quote a value for a Dockerfile ENV instruction.
/// Embedded quotes and backslashes are escaped to prevent injection.
fn env_quote(value: &str) -> String {
    if value.contains('$') || value.contains(' ') || value.contains('"') || value.contains('\\') {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> ImageRecipe {
        ImageRecipe::from_base("docker.io/library/python:3.11-slim")
            .apt_install(&["git", "wget"])
            .pip_install(&["fastapi[standard]==0.115.4", "comfy-cli"])
            .run_commands(&["comfy --skip-prompt install --fast-deps --nvidia"])
            .env("HF_HUB_ENABLE_HF_TRANSFER", "1")
    }

    #[test]
    fn dockerfile_structure() {
        let dockerfile = sample_recipe().dockerfile();

        assert!(dockerfile.starts_with("FROM docker.io/library/python:3.11-slim"));
        assert!(dockerfile.contains("apt-get install -y --no-install-recommends git wget"));
        assert!(dockerfile.contains("pip install --no-cache-dir 'fastapi[standard]==0.115.4' comfy-cli"));
        assert!(dockerfile.contains("RUN comfy --skip-prompt install --fast-deps --nvidia"));
        assert!(dockerfile.contains("ENV HF_HUB_ENABLE_HF_TRANSFER=1"));
    }

    #[test]
    fn steps_render_in_order() {
        let dockerfile = sample_recipe().dockerfile();
        let apt = dockerfile.find("apt-get install").unwrap();
        let pip = dockerfile.find("pip install").unwrap();
        let comfy = dockerfile.find("comfy --skip-prompt").unwrap();
        assert!(apt < pip && pip < comfy);
    }

    #[test]
    fn tag_is_deterministic() {
        let a = sample_recipe().tag("flux-comfyui");
        let b = sample_recipe().tag("flux-comfyui");
        assert_eq!(a, b);
        assert!(a.starts_with("flux-comfyui-"));
        assert_eq!(a.len(), "flux-comfyui-".len() + 12);
    }

    #[test]
    fn tag_changes_with_base_image() {
        let a = ImageRecipe::from_base("python:3.11-slim").tag("app");
        let b = ImageRecipe::from_base("python:3.12-slim").tag("app");
        assert_ne!(a, b);
    }

    #[test]
    fn tag_changes_with_instructions() {
        let a = sample_recipe().tag("app");
        let b = sample_recipe().run_commands(&["rm -rf /tmp/x"]).tag("app");
        assert_ne!(a, b);
    }

    #[test]
    fn context_files_lists_copy_sources() {
        let recipe = sample_recipe().copy("workflow.json", "/root/workflow.json");
        assert_eq!(recipe.context_files(), vec!["workflow.json"]);
    }

    #[test]
    fn shell_quote_plain() {
        assert_eq!(shell_quote("comfy-cli"), "comfy-cli");
        assert_eq!(shell_quote("numpy==2.2"), "numpy==2.2");
    }

    #[test]
    fn shell_quote_extras() {
        assert_eq!(
            shell_quote("fastapi[standard]==0.115.4"),
            "'fastapi[standard]==0.115.4'"
        );
    }

    #[test]
    fn env_quote_with_variable() {
        assert_eq!(env_quote("/opt/bin:${PATH}"), "\"/opt/bin:${PATH}\"");
    }

    #[test]
    fn env_quote_escapes_embedded_quotes() {
        assert_eq!(
            env_quote("value with \"quotes\""),
            "\"value with \\\"quotes\\\"\""
        );
    }
}
