use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::slideshow::{StartMode, TransitionDefaults, TransitionName};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "nbdeck";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// `first`, `current`, or `none` to open the notebook without presenting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_mode: Option<String>,

    /// Transition for cells that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<f32>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `nbdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# nbdeck configuration - https://github.com/mklab-se/nbdeck\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                defaults.theme = Some(value.to_string());
            }
            "defaults.start_mode" => {
                if value != "none" {
                    value
                        .parse::<StartMode>()
                        .map_err(|_| {
                            anyhow::anyhow!(
                                "Invalid start_mode: {value}. Must be 'first', 'current', or 'none'."
                            )
                        })?;
                }
                defaults.start_mode = Some(value.to_string());
            }
            "defaults.transition" => {
                if value != "none" && TransitionName::parse(value).is_none() {
                    anyhow::bail!(
                        "Invalid transition: {value}. Must be 'slide', 'fade', 'zoom', or 'none'."
                    );
                }
                defaults.transition = Some(value.to_string());
            }
            "defaults.transition_duration" => {
                let seconds = value
                    .trim_end_matches('s')
                    .parse::<f32>()
                    .ok()
                    .filter(|s| s.is_finite() && *s > 0.0)
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid transition_duration: {value}. Must be a positive number of seconds."
                        )
                    })?;
                defaults.transition_duration = Some(seconds);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.start_mode, defaults.transition, defaults.transition_duration"
            ),
        }
        Ok(())
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    /// Start mode to enter right after the window opens, if any.
    pub fn start_mode(&self) -> Option<StartMode> {
        self.defaults
            .as_ref()
            .and_then(|d| d.start_mode.as_deref())
            .and_then(|s| s.parse().ok())
    }

    pub fn transition_defaults(&self) -> TransitionDefaults {
        let defaults = self.defaults.as_ref();
        TransitionDefaults {
            name: defaults
                .and_then(|d| d.transition.as_deref())
                .and_then(TransitionName::parse),
            duration: defaults.and_then(|d| d.transition_duration),
        }
    }
}
