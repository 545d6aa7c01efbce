//! `[assets]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! root = "public"   # Directory whose files are hashed and served
//! ```
//!
//! A relative `root` is resolved against the directory holding the config
//! file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Asset file set settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Asset root directory.
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
        }
    }
}
