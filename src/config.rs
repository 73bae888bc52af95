//! Configuration module for sharpdoc.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SD_` and use double underscores
//! to separate nested levels:
//! - `SD_RESOLUTION__ALLOW_CREATE=false` sets `resolution.allow_create`
//! - `SD_LOGGING__LEVEL=debug` sets `logging.level`
//! - `SD_CATALOG_PATH=/tmp/catalog.db` sets `catalog_path`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding settings and the catalog, relative to the workspace root
pub const CONFIG_DIR: &str = ".sharpdoc";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Path to the SQLite catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Workspace root directory (where .sharpdoc is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    #[serde(default)]
    pub scanning: ScanningConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanningConfig {
    /// File extensions to scan, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns to ignore, in addition to .gitignore and .sharpdocignore
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Skip `*.g.cs` and `*.Designer.cs` files
    #[serde(default = "default_true")]
    pub skip_generated: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResolutionConfig {
    /// Catalogue external and tuple types the first time they are seen
    #[serde(default = "default_true")]
    pub allow_create: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_version() -> u32 {
    1
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("catalog.db")
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_extensions() -> Vec<String> {
    vec!["cs".to_string()]
}
fn default_ignore_patterns() -> Vec<String> {
    vec!["bin/**".to_string(), "obj/**".to_string()]
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog_path: default_catalog_path(),
            workspace_root: None,
            debug: false,
            scanning: ScanningConfig::default(),
            resolution: ResolutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            skip_generated: true,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self { allow_create: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .sharpdoc directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay part of the field name
            .merge(Env::prefixed("SD_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the workspace settings file by looking for a .sharpdoc directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .sharpdoc is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Catalog path, resolved against the workspace root when relative
    pub fn resolved_catalog_path(&self) -> PathBuf {
        match &self.workspace_root {
            Some(root) if self.catalog_path.is_relative() => root.join(&self.catalog_path),
            _ => self.catalog_path.clone(),
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# sharpdoc configuration

# Version of the configuration schema
version = 1

# Path to the SQLite catalog (relative to workspace root)
catalog_path = ".sharpdoc/catalog.db"

# Global debug mode
debug = false

[scanning]
# File extensions to scan
extensions = ["cs"]

# Additional patterns to ignore (.gitignore and .sharpdocignore are always honoured)
ignore_patterns = ["bin/**", "obj/**"]

# Skip generated sources (*.g.cs, *.Designer.cs)
skip_generated = true

[resolution]
# Catalogue external and tuple types the first time they are referenced
allow_create = true

[logging]
# error, warn, info, debug or trace
level = "warn"
"#;

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
