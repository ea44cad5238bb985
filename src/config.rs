use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::controller::tools::DEFAULT_DIGEST_DAYS;
use crate::controller::{SlotPolicy, ToolInputs};

/// Main configuration for RepoGuide
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub tools: ToolsConfig,
}

/// Where the gateway lives and how overlapping responses are applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway (overridden by `--server` / `REPOGUIDE_API_BASE`)
    pub base_url: String,
    /// "last-resolved-wins" (default) or "last-sent-wins"
    pub slot_policy: SlotPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            slot_policy: SlotPolicy::default(),
        }
    }
}

/// Initial values of the shared tool inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Repository path sent to preflight/index/digest/onboard
    pub path: String,
    /// Change digest window in days
    pub days: u32,
    /// Whether onboarding also indexes the repository
    pub index_on_onboard: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            path: ".".into(),
            days: DEFAULT_DIGEST_DAYS,
            index_on_onboard: false,
        }
    }
}

impl ToolsConfig {
    pub fn inputs(&self) -> ToolInputs {
        ToolInputs::new(self.path.clone(), self.days, self.index_on_onboard)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the config if present, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the per-user RepoGuide directory
    pub fn default_home() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("dev", "repoguide", "repoguide")
            .context("Failed to determine user directories")?;
        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path inside a home directory
    pub fn config_path(home: &Path) -> PathBuf {
        home.join("config.toml")
    }

    /// Get the preferences file path inside a home directory
    pub fn preferences_path(home: &Path) -> PathBuf {
        home.join("preferences.toml")
    }
}
