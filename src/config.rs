//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/gatetree/gatetree.toml`
//! 3. Local config: explicit file passed by the caller
//! 4. Environment variables: `GATETREE_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{IdPolicy, RenderStyle, TreeArena, SEPARATOR};

/// Unified configuration for gatetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Joins node names in paths (default: "/")
    pub separator: String,
    /// Id assignment policy for new trees
    pub id_policy: IdPolicy,
    /// Node labels used by `render`
    pub render_style: RenderStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: SEPARATOR.to_string(),
            id_policy: IdPolicy::default(),
            render_style: RenderStyle::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub separator: Option<String>,
    pub id_policy: Option<IdPolicy>,
    pub render_style: Option<RenderStyle>,
}

/// Get the XDG config directory for gatetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gatetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("gatetree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Where [`Settings::load_from`] reads its layers.
///
/// [`SettingsSources::system`] is what the CLI uses. [`SettingsSources::isolated`]
/// ignores the machine's global file and process environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsSources {
    /// Skipped when the file does not exist
    pub global: Option<PathBuf>,
    /// Must exist when given
    pub local: Option<PathBuf>,
    /// `GATETREE_*` variables; `None` reads the process environment
    pub env: Option<Map<String, String>>,
}

impl SettingsSources {
    pub fn system(local: Option<&Path>) -> Self {
        Self {
            global: global_config_path(),
            local: local.map(Path::to_path_buf),
            env: None,
        }
    }

    pub fn isolated(local: Option<&Path>, env: Map<String, String>) -> Self {
        Self {
            global: None,
            local: local.map(Path::to_path_buf),
            env: Some(env),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence from the real machine.
    ///
    /// A missing global file is skipped; a missing `local` file is an error,
    /// since the caller asked for it explicitly.
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_from(&SettingsSources::system(local))
    }

    pub fn load_from(sources: &SettingsSources) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = &sources.global {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(local_path) = &sources.local {
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        current = Self::apply_env_overrides(current, sources.env.clone())?;
        current.validate()?;
        Ok(current)
    }

    /// Scalar options: overlay wins if Some, otherwise keep base.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            separator: overlay
                .separator
                .clone()
                .unwrap_or_else(|| self.separator.clone()),
            id_policy: overlay.id_policy.unwrap_or(self.id_policy),
            render_style: overlay.render_style.unwrap_or(self.render_style),
        }
    }

    /// Apply GATETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GATETREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("separator") {
            settings.separator = val;
        }
        if let Ok(val) = config.get_string("id_policy") {
            settings.id_policy = val
                .parse::<IdPolicy>()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("render_style") {
            settings.render_style = val
                .parse::<RenderStyle>()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        Ok(settings)
    }

    pub fn validate(&self) -> ApplicationResult<()> {
        if self.separator.is_empty() {
            return Err(ApplicationError::Config {
                message: "separator must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Empty arena configured from these settings.
    pub fn arena<G, E>(&self) -> TreeArena<G, E> {
        TreeArena::new()
            .with_separator(self.separator.clone())
            .with_id_policy(self.id_policy)
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
