//! Configuration file support for xcpkg.
//!
//! xcpkg reads a single optional file, `config.toml` in the user's
//! configuration directory (`~/.config/xcpkg` on Linux,
//! `~/Library/Application Support/dev.xcpkg.xcpkg` on macOS). The CLI's
//! `--config` flag points at another file instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default name of the file marking a folder as a Swift package.
pub const DEFAULT_PACKAGE_MANIFEST: &str = "Package.swift";

/// Default location of `Package.resolved`, relative to the project bundle.
pub const DEFAULT_RESOLVED_PATH: &str =
    "project.xcworkspace/xcshareddata/swiftpm/Package.resolved";

/// xcpkg configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser settings
    pub parse: ParseConfig,
}

/// Settings of the project parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// File whose presence marks a referenced folder as a local package
    pub package_manifest: String,

    /// Consult `Package.resolved` for pins
    pub read_resolved: bool,

    /// `Package.resolved` location relative to the project bundle
    pub resolved_path: PathBuf,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            package_manifest: DEFAULT_PACKAGE_MANIFEST.to_string(),
            read_resolved: true,
            resolved_path: PathBuf::from(DEFAULT_RESOLVED_PATH),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("ignoring config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Load the user configuration, or defaults when there is none.
    pub fn discover() -> Self {
        match user_config_path() {
            Some(path) => {
                tracing::debug!("looking for config at {}", path.display());
                Self::load_or_default(&path)
            }
            None => Self::default(),
        }
    }
}

/// Get the user config directory, if a home directory is known.
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "xcpkg", "xcpkg")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the user config path (`<config dir>/config.toml`).
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("config.toml"))
}
