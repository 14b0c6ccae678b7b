//! Download credentials
//!
//! A `tokens.json` file maps credential names to secret strings, read
//! once at build time and threaded into the download steps that need
//! authenticated access.

use crate::config::ConfigManager;
use crate::error::{ComfyPodError, ComfyPodResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// HuggingFace access token (gated model downloads)
pub const HF_TOKEN: &str = "HF_TOKEN";

/// Civitai API token (appended to download URLs)
pub const CIVITAI_TOKEN: &str = "CIVITAI_TOKEN";

/// Credential map loaded from tokens.json
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: HashMap<String, String>,
    searched: Vec<PathBuf>,
}

impl TokenStore {
    /// Load tokens from an explicit file. The file must exist and parse.
    pub async fn load(path: &Path) -> ComfyPodResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ComfyPodError::io(format!("reading tokens from {}", path.display()), e))?;

        let tokens: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| ComfyPodError::TokensInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!("Loaded {} token(s) from {}", tokens.len(), path.display());
        Ok(Self {
            tokens,
            searched: vec![path.to_path_buf()],
        })
    }

    /// Discover and load tokens: explicit override, then ./tokens.json,
    /// then the config directory. A missing file yields an empty store;
    /// the failure surfaces only when a download actually needs a token.
    pub async fn discover(explicit: Option<&Path>) -> ComfyPodResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }

        let candidates = [
            PathBuf::from("tokens.json"),
            ConfigManager::default_tokens_path(),
        ];

        for candidate in &candidates {
            if candidate.exists() {
                return Self::load(candidate).await;
            }
        }

        debug!("No tokens file found, continuing without credentials");
        Ok(Self {
            tokens: HashMap::new(),
            searched: candidates.to_vec(),
        })
    }

    /// Get a token by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    /// Get a token by name, failing with the searched locations if absent
    pub fn require(&self, name: &str) -> ComfyPodResult<&str> {
        self.get(name).ok_or_else(|| ComfyPodError::TokenMissing {
            name: name.to_string(),
            searched: self
                .searched
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Number of tokens loaded
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether any tokens were loaded
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_map(tokens: HashMap<String, String>) -> Self {
        Self {
            tokens,
            searched: vec![PathBuf::from("tokens.json")],
        }
    }
}
