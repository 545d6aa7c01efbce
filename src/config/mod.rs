//! Configuration management for `hashfs.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [assets]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional: without one every section takes its
//! defaults, rooted at the current directory. CLI flags override file values.

pub mod section;
mod error;
mod util;

pub use error::ConfigError;
pub use section::{AssetsConfig, ServeConfig};

use util::find_config_file;

use crate::{cli::Cli, cli::Commands, debug, log, serve::StaticOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing hashfs.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Asset file set settings
    #[serde(default)]
    pub assets: AssetsConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl Config {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file; falls back to defaults
    /// when none exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        config.finalize(&root);
        config.apply_command_options(cli, &cwd);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Resolve relative paths against the project root.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        if self.assets.root.is_relative() {
            self.assets.root = root.join(&self.assets.root);
        }
    }

    /// Apply CLI overrides on top of file values.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        if let Some(root) = &cli.assets().root {
            self.assets.root = cwd.join(root);
        }

        if let Commands::Serve {
            interface, port, ..
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
        }
    }

    /// Check values that would only fail later, at use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.threads == 0 {
            return Err(ConfigError::Validation(
                "serve.threads must be at least 1".into(),
            ));
        }
        if !self.assets.root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "asset root `{}` is not a directory",
                self.assets.root.display()
            )));
        }
        Ok(())
    }

    /// Response options for the static file handler.
    pub fn static_options(&self) -> StaticOptions {
        let cache_control = &self.serve.cache_control;
        StaticOptions {
            cache_control: (!cache_control.is_empty()).then(|| cache_control.clone()),
        }
    }
}

/// Parse a test config, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
