// src/config.rs

//! Component manager configuration
//!
//! # Example config.toml
//!
//! ```toml
//! [install]
//! # Where fetched component repositories are staged
//! specifications_path = "/var/lib/compman/specifications"
//! # Extension of knowledge source files inside component repositories
//! source_extension = "scs"
//! # Remote addresses must start with one of these to be fetched
//! remote_prefixes = ["https://github.com/"]
//!
//! [git]
//! program = "git"
//! clone_timeout_secs = 300
//! shallow = true
//! ```

use crate::error::{Error, Result};
use crate::source::DEFAULT_SOURCE_EXTENSION;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote prefix recognised when no configuration overrides it
pub const DEFAULT_REMOTE_PREFIX: &str = "https://github.com/";

/// Default clone timeout (5 minutes)
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 300;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ManagerConfig {
    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub git: GitConfig,
}

/// `[install]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InstallConfig {
    /// Root directory for staged component repositories
    #[serde(default = "default_specifications_path")]
    pub specifications_path: PathBuf,

    /// Extension of knowledge source files (without the dot)
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Address prefixes the fetcher knows how to clone
    #[serde(default = "default_remote_prefixes")]
    pub remote_prefixes: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            specifications_path: default_specifications_path(),
            source_extension: default_source_extension(),
            remote_prefixes: default_remote_prefixes(),
        }
    }
}

/// `[git]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitConfig {
    /// Git executable, looked up on PATH when not absolute
    #[serde(default = "default_git_program")]
    pub program: String,

    /// Seconds before a running clone is killed
    #[serde(default = "default_clone_timeout_secs")]
    pub clone_timeout_secs: u64,

    /// Clone with `--depth 1`
    #[serde(default = "default_shallow")]
    pub shallow: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
            clone_timeout_secs: default_clone_timeout_secs(),
            shallow: default_shallow(),
        }
    }
}

impl GitConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

fn default_specifications_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("compman")
        .join("specifications")
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_remote_prefixes() -> Vec<String> {
    vec![DEFAULT_REMOTE_PREFIX.to_string()]
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_clone_timeout_secs() -> u64 {
    DEFAULT_CLONE_TIMEOUT_SECS
}

fn default_shallow() -> bool {
    true
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("compman").join("config.toml"))
}

impl ManagerConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ManagerConfig =
            toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let extension = &self.install.source_extension;
        if extension.is_empty() || extension.starts_with('.') {
            return Err(Error::ConfigError(format!(
                "source_extension must be a bare extension like \"scs\", got \"{}\"",
                extension
            )));
        }
        if self.install.remote_prefixes.iter().any(|p| p.is_empty()) {
            return Err(Error::ConfigError(
                "remote_prefixes must not contain empty entries".to_string(),
            ));
        }
        if self.git.clone_timeout_secs == 0 {
            return Err(Error::ConfigError(
                "clone_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
