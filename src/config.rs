//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/checktree/checktree.toml`
//! 3. Explicit config file passed to [`Settings::load`]
//! 4. Environment variables: `CHECKTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::TreeError;

/// How node paths are spelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathSettings {
    /// Joins ancestor names into a path (default: "/")
    pub separator: String,
    /// Parent-path key for children of the root (default: "root")
    pub root_key: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            separator: "/".into(),
            root_key: "root".into(),
        }
    }
}

/// Glyphs used by the text renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    pub checked: String,
    pub partial: String,
    pub unchecked: String,
    /// Marker in front of a branch that is not open
    pub collapsed: String,
    /// Marker in front of an open branch
    pub expanded: String,
    /// Colour the checkbox glyphs
    pub color: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            checked: "[x]".into(),
            partial: "[-]".into(),
            unchecked: "[ ]".into(),
            collapsed: "+".into(),
            expanded: "-".into(),
            color: false,
        }
    }
}

/// Raw path settings (Option to detect "not specified" while merging).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPathSettings {
    pub separator: Option<String>,
    pub root_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub checked: Option<String>,
    pub partial: Option<String>,
    pub unchecked: Option<String>,
    pub collapsed: Option<String>,
    pub expanded: Option<String>,
    pub color: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub paths: RawPathSettings,
    pub render: RawRenderSettings,
}

/// Unified configuration for checktree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub render: RenderSettings,
}

/// Get the XDG config directory for checktree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "checktree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("checktree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, TreeError> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let p = &overlay.paths;
        let r = &overlay.render;
        Self {
            paths: PathSettings {
                separator: p
                    .separator
                    .clone()
                    .unwrap_or_else(|| self.paths.separator.clone()),
                root_key: p
                    .root_key
                    .clone()
                    .unwrap_or_else(|| self.paths.root_key.clone()),
            },
            render: RenderSettings {
                checked: r
                    .checked
                    .clone()
                    .unwrap_or_else(|| self.render.checked.clone()),
                partial: r
                    .partial
                    .clone()
                    .unwrap_or_else(|| self.render.partial.clone()),
                unchecked: r
                    .unchecked
                    .clone()
                    .unwrap_or_else(|| self.render.unchecked.clone()),
                collapsed: r
                    .collapsed
                    .clone()
                    .unwrap_or_else(|| self.render.collapsed.clone()),
                expanded: r
                    .expanded
                    .clone()
                    .unwrap_or_else(|| self.render.expanded.clone()),
                color: r.color.unwrap_or(self.render.color),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional config file layered over the global one
    ///
    /// A missing global file is not an error; a missing explicit file is.
    pub fn load(config_file: Option<&Path>) -> Result<Self, TreeError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Defaults overlaid with a single file, no global config or env vars.
    pub fn from_file(path: &Path) -> Result<Self, TreeError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply CHECKTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, TreeError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CHECKTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("paths.separator") {
            settings.paths.separator = val;
        }
        if let Ok(val) = config.get_string("paths.root_key") {
            settings.paths.root_key = val;
        }
        if let Ok(val) = config.get_string("render.checked") {
            settings.render.checked = val;
        }
        if let Ok(val) = config.get_string("render.partial") {
            settings.render.partial = val;
        }
        if let Ok(val) = config.get_string("render.unchecked") {
            settings.render.unchecked = val;
        }
        if let Ok(val) = config.get_string("render.collapsed") {
            settings.render.collapsed = val;
        }
        if let Ok(val) = config.get_string("render.expanded") {
            settings.render.expanded = val;
        }
        if let Ok(val) = config.get_bool("render.color") {
            settings.render.color = val;
        }

        Ok(settings)
    }

    /// Serialize the effective settings (e.g. to seed a global config file).
    pub fn to_toml(&self) -> Result<String, TreeError> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
