use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dashkit::{FileStorage, KeyContext};

const CONFIG_DIR: &str = ".dashkit";
const CONFIG_FILE: &str = "config.toml";

/// Where dashkit keeps its state for the current working tree
pub struct ProjectContext {
    /// Directory holding `.dashkit/` (or the start directory when none exists)
    pub root: PathBuf,
    /// Loaded configuration
    pub config: Option<DashkitConfig>,
}

/// Configuration stored in .dashkit/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashkitConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub filters: FilterSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// JSON file holding persisted filter values. `${VAR}` is expanded.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Optional key prefix shared by every filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            namespace: None,
        }
    }
}

fn default_storage_path() -> String {
    ".dashkit/filters.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Number of years offered by the year filter, ending with the current year.
    #[serde(default = "default_year_span")]
    pub year_span: u16,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            year_span: default_year_span(),
        }
    }
}

fn default_year_span() -> u16 {
    5
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Use the nearest ancestor holding a config file, or `start` itself
    pub fn find_from(start: &Path) -> Result<Self> {
        let root = start
            .ancestors()
            .find(|dir| Self::config_path(dir).is_file())
            .unwrap_or(start)
            .to_path_buf();
        Self::from_root(root)
    }

    /// Config file location under `root`, whether or not it exists yet
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn from_root(root: PathBuf) -> Result<Self> {
        let config_path = Self::config_path(&root);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;
            let config: DashkitConfig = toml::from_str(&content).context("Failed to parse config.toml")?;
            Some(config)
        } else {
            None
        };

        Ok(Self { root, config })
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    pub fn settings(&self) -> DashkitConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Resolve the storage file, honoring an explicit override first
    pub fn storage_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }

        let configured = expand_env(&self.settings().storage.path)?;
        let path = PathBuf::from(configured);
        Ok(if path.is_absolute() { path } else { self.root.join(path) })
    }

    pub fn storage(&self, override_path: Option<&Path>) -> Result<FileStorage> {
        Ok(FileStorage::new(self.storage_path(override_path)?))
    }

    pub fn keys(&self) -> KeyContext {
        match self.settings().storage.namespace {
            Some(namespace) => KeyContext::new(namespace),
            None => KeyContext::bare(),
        }
    }
}

/// Expand a value of the form `${VAR}`; anything else is returned as-is
fn expand_env(value: &str) -> Result<String> {
    if let Some(var_name) = value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))
    } else {
        Ok(value.to_string())
    }
}
