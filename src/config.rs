//! User configuration.
//!
//! One toml file holding the controller layout, the control style, and an
//! independent enable flag per fix. A missing file degrades to defaults;
//! a default file can be written out so users have something to edit.

use crate::input::{ControlStyle, ControllerLayout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no config directory available on this system")]
    NoConfigDir,
}

/// The recognized options surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Physical arrangement of the connected pad's face buttons.
    pub layout: ControllerLayout,
    /// Which convention confirm/cancel should follow.
    pub style: ControlStyle,

    pub toolbar_fix: bool,
    pub held_item_fix: bool,
    pub nav_fix: bool,
    pub sort_fix: bool,
    /// Recognized but driven by the chest collaborator, not by this core.
    pub stack_fix: bool,

    /// Use shoulders + d-pad where analog triggers are undetected.
    pub alternate_triggers: bool,
    /// Diagnostic only; widens the log filter, changes no behavior.
    pub verbose_logging: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            layout: ControllerLayout::default(),
            style: ControlStyle::default(),
            toolbar_fix: true,
            held_item_fix: true,
            nav_fix: true,
            sort_fix: true,
            stack_fix: true,
            alternate_triggers: false,
            verbose_logging: false,
        }
    }
}

impl Options {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("padbridge").join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Missing files are not an error; the defaults keep everything
    /// usable.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let options: Options = toml::from_str(&content)?;
        info!("loaded config from {:?}", path);
        Ok(options)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Writes the default file once so users have something to edit.
    pub fn ensure_default_config() -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            info!("writing default config to {:?}", path);
            Self::default().save_to(&path)?;
        }
        Ok(())
    }
}
