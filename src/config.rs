//! Layered configuration for the uniqwalk binary.
//!
//! Settings are merged with figment in increasing priority:
//! defaults < TOML file < `UNIQWALK_*` environment variables < CLI flags.
//! The TOML file is either given with `--config` or looked up in the
//! platform config directory (`uniqwalk/config.toml`).
//!
//! ```toml
//! recursive = true
//! algorithm = "blake3"
//! extensions = ["jpg", "png"]
//! exclude = ["^\\."]
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::HashAlgorithm;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "UNIQWALK_";

/// Walk and filter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Search subdirectories.
    pub recursive: bool,
    /// Report every file as unique and skip hashing.
    pub allow_dupes: bool,
    /// Digest used to compare file contents.
    pub algorithm: HashAlgorithm,
    /// Visit entries in file-name order.
    pub sort_entries: bool,
    /// Only include files with these extensions (case-insensitive, no dot).
    /// Empty means all files.
    pub extensions: Vec<String>,
    /// Regular expressions; a file whose name matches any of them is excluded.
    pub exclude: Vec<String>,
    /// Exclude files whose name starts with `.`.
    pub skip_hidden: bool,
}

impl Settings {
    /// Load settings from defaults, the config file and the environment.
    ///
    /// An explicitly given `config_path` must exist; the default location
    /// is optional.
    ///
    /// # Errors
    ///
    /// Fails if an explicit config file is missing or any source is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = &file {
            log::debug!("Loading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment.extract().context("Invalid configuration")
    }

    /// Platform-specific default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "uniqwalk", "uniqwalk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
