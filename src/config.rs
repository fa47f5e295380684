//! TOML configuration, loaded once at startup.
//!
//! Every field has a default, so a file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoseConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub rose: GrowthConfig,
    pub ui: UiConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Rose Day".into(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub vsync: bool,
    /// sRGB clear color, each component in [0, 1].
    pub background: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            background: [1.0, 0.94, 0.96],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_panel: bool,
    /// Frames per second; 0 leaves the loop uncapped.
    pub fps_cap: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_panel: true,
            fps_cap: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub track: Option<PathBuf>,
}

impl RoseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if let Some(c) = self
            .render
            .background
            .iter()
            .find(|c| !(0.0..=1.0).contains(*c))
        {
            return Err(ConfigError::Invalid(format!(
                "background components must be in [0, 1], got {c}"
            )));
        }

        Ok(())
    }
}

pub fn parse(content: &str) -> Result<RoseConfig, ConfigError> {
    let config: RoseConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: &Path) -> Result<RoseConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse(&content)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// `~/.config/rose3d/config.toml` on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("rose3d").join("config.toml"))
}

/// Loads `path`, or the default location when `None`. Never fails: a missing
/// file yields defaults and a broken one is logged before falling back.
pub fn load(path: Option<&Path>) -> RoseConfig {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}, using default config");
                return RoseConfig::default();
            }
        },
    };

    match load_from_path(&path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            info!("no config at {}, using defaults", path.display());
            RoseConfig::default()
        }
        Err(e) => {
            tracing::error!("{e}");
            warn!("falling back to default config");
            RoseConfig::default()
        }
    }
}
