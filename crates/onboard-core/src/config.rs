//! Application configuration management.
//!
//! Settings come from `~/.config/onboard/config.json` and may be overridden
//! by environment variables (a `.env` file in the working directory is
//! honored):
//!
//! | variable | field |
//! |---|---|
//! | `ONBOARD_BASE_URL` | `base_url` |
//! | `ONBOARD_TOKEN` | `token` |
//! | `ONBOARD_ASSET` | `asset` |
//! | `ONBOARD_ASSET_MEDEVAC` | `asset_medevac` |
//! | `ONBOARD_ASSET_DISEMBARK` | `asset_disembark` |
//! | `ONBOARD_ROTATIONS` | `rotations_path` |

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "onboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Survey platform API root used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://kobo.ifrc.org/api/v2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    /// Intake form asset id
    pub asset: Option<String>,
    pub asset_medevac: Option<String>,
    pub asset_disembark: Option<String>,
    /// Rotation calendar in values-grid JSON
    pub rotations_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            asset: None,
            asset_medevac: None,
            asset_disembark: None,
            rotations_path: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| dotenvy::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Overwrite fields with any non-empty value `lookup` returns for the
    /// `ONBOARD_*` variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("ONBOARD_BASE_URL") {
            self.base_url = url;
        }
        if let Some(token) = get("ONBOARD_TOKEN") {
            self.token = Some(token);
        }
        if let Some(asset) = get("ONBOARD_ASSET") {
            self.asset = Some(asset);
        }
        if let Some(asset) = get("ONBOARD_ASSET_MEDEVAC") {
            self.asset_medevac = Some(asset);
        }
        if let Some(asset) = get("ONBOARD_ASSET_DISEMBARK") {
            self.asset_disembark = Some(asset);
        }
        if let Some(path) = get("ONBOARD_ROTATIONS") {
            self.rotations_path = Some(PathBuf::from(path));
        }
    }

    pub fn require_token(&self) -> Result<&str> {
        required(self.token.as_deref(), "ONBOARD_TOKEN")
    }

    pub fn require_asset(&self) -> Result<&str> {
        required(self.asset.as_deref(), "ONBOARD_ASSET")
    }

    pub fn require_rotations_path(&self) -> Result<&PathBuf> {
        self.rotations_path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Rotation calendar not configured (set ONBOARD_ROTATIONS)"))
    }
}

fn required<'a>(value: Option<&'a str>, variable: &str) -> Result<&'a str> {
    value.ok_or_else(|| anyhow::anyhow!("Missing configuration value (set {})", variable))
}
