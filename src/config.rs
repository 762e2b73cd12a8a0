use crate::api::{DEFAULT_ORIGIN, api_base};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Env var that overrides the configured backend origin (wired through clap).
pub const ENV_API_URL: &str = "SPEAK_FOOTBALL_API_URL";

/// Per-user settings, stored as `config.toml` in the platform config dir.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Where config and session files live. Created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "speakfootball", "speak-football")
        .context("Could not determine config directory")?;
    let dir = proj_dirs.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Missing file means defaults, a broken one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).with_context(|| format!("Could not parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Stores a new backend origin after making sure it's a usable http(s) URL.
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        api_base(url).with_context(|| format!("Not a valid backend URL: {url}"))?;
        self.api_url = Some(url.trim().trim_end_matches('/').to_string());
        Ok(())
    }

    /// Flag (or env var, clap folds those together) beats the file beats the default.
    pub fn effective_api_url(&self, override_url: Option<&str>) -> String {
        override_url
            .map(str::to_string)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
    }
}
