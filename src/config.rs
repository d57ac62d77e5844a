// Application configuration.
// Loaded from YAML, with built-in defaults when no file exists.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{GistError, Result};
use crate::github::GITHUB_API_BASE;

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub api_url: String,
    /// Records requested per page.
    pub per_page: u32,
    /// Files listed on the detail screen.
    pub max_files: usize,
    /// Default tracing filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_BASE.to_string(),
            per_page: 30,
            max_files: 5,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// Search order:
    /// 1. Explicit path if provided (must exist)
    /// 2. ./gistview.yaml (current directory)
    /// 3. the platform config dir, e.g. ~/.config/gistview/config.yaml
    ///
    /// Falls back to defaults when no file is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => {
                return Err(GistError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            None => Self::find_config_file(),
        };

        let config = match path {
            Some(p) => Self::load_from_path(&p)?,
            None => Self::default(),
        };
        Ok(config.normalized())
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("gistview.yaml");
        if local.exists() {
            return Some(local);
        }

        let xdg_path = project_dirs()?.config_dir().join("config.yaml");
        xdg_path.exists().then_some(xdg_path)
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GistError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            GistError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Override the page size, clamped to what the API accepts.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self.normalized()
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn normalized(mut self) -> Self {
        self.per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        self
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "gistview")
}

/// Directory for the log file (~/.cache/gistview on Linux).
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}
