//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/soltree/soltree.toml`
//! 3. Local config: `<dir>/.soltree.toml` (normally the working directory)
//! 4. Environment variables: `SOLTREE_*` prefix (`SOLTREE_WALK__PROMPT` for nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Interactive walk settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WalkConfig {
    /// Prompt shown by the selector
    pub prompt: String,
    /// Print the breadcrumb of visited nodes before each step
    pub show_path: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".into(),
            show_path: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawWalkConfig {
    pub prompt: Option<String>,
    pub show_path: Option<bool>,
}

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub editor: Option<String>,
    pub walk: RawWalkConfig,
}

impl WalkConfig {
    fn merge(&self, overlay: &RawWalkConfig) -> Self {
        Self {
            prompt: overlay.prompt.clone().unwrap_or_else(|| self.prompt.clone()),
            show_path: overlay.show_path.unwrap_or(self.show_path),
        }
    }
}

/// Unified configuration for soltree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON document store (default: ~/.soltree/store.json)
    pub store_path: PathBuf,
    /// Editor command for composing node text (default: $EDITOR or "vim")
    pub editor: String,
    pub walk: WalkConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".into());

        Self {
            store_path: default_store_path(),
            editor,
            walk: WalkConfig::default(),
        }
    }
}

fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".soltree").join("store.json"))
        .unwrap_or_else(|| PathBuf::from("~/.soltree/store.json"))
}

/// Get the XDG config directory for soltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "soltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("soltree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".soltree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
        self.editor = expand_env_vars(&self.editor);
    }

    /// Use `path` as store, expanded the same way as a configured value.
    pub fn override_store_path(&mut self, path: &Path) {
        self.store_path = PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()));
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            editor: overlay
                .editor
                .clone()
                .unwrap_or_else(|| self.editor.clone()),
            walk: self.walk.merge(&overlay.walk),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `local_dir` is searched for `.soltree.toml`; pass the working
    /// directory from the CLI.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = local_dir.map(local_config_path);
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Layered load from explicit file locations; missing files are skipped.
    pub fn load_from(
        global_path: Option<&Path>,
        local_path: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        for path in [global_path, local_path].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SOLTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SOLTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("editor") {
            settings.editor = val;
        }
        if let Ok(val) = config.get_string("walk.prompt") {
            settings.walk.prompt = val;
        }
        if let Ok(val) = config.get_bool("walk.show_path") {
            settings.walk.show_path = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# soltree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/soltree/soltree.toml
#   Local:  ./.soltree.toml
#   Env:    SOLTREE_* environment variables (SOLTREE_WALK__PROMPT for [walk].prompt)

# JSON document store holding content, trees and nodes
# store_path = "~/.soltree/store.json"

# Editor for composing node text; arguments are split on whitespace
# editor = "code --wait"

[walk]
# Prompt shown when choosing an option
# prompt = "> "

# Print the visited path before each question
# show_path = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
