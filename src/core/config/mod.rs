//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! patchset has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! Mail recipients are not kept here. They live in git config
//! (`patchset.to`, `branch.<name>.cc`, ...) where `format-patch` and
//! `send-email` can see them.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$PATCHSET_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/patchset/config.toml`
//! 3. `~/.patchset/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/patchset/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use patchset::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! let config = result.config;
//!
//! println!("Export to: {}", config.export_dir("foo").display());
//! println!("Signoff: {}", config.import_signoff());
//! ```

pub mod schema;

pub use schema::{ExportDefaults, FileConfig, ImportDefaults};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: repo over global over
/// built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Repository configuration (if in a repo and present)
    pub repo: Option<FileConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Default base directory for exported series.
    pub const DEFAULT_OUTPUT_DIR: &'static str = "patches";

    /// Default revision imported series start from.
    pub const DEFAULT_START_POINT: &'static str = "HEAD";

    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads repo-specific config from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(git_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global_path = Self::find_global(&mut warnings);
        let global = match &global_path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };

        let repo_path = git_dir
            .map(Self::repo_config_path)
            .filter(|path| path.exists());
        let repo = repo_path.as_deref().map(Self::read_config).transpose()?;

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path,
            },
            warnings,
        })
    }

    /// Locate the global config file, if any.
    fn find_global(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PATCHSET_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: "PATCHSET_CONFIG points to a missing file; ignoring it".to_string(),
                path,
            });
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("patchset/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".patchset/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path of the repo config inside `git_dir`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("patchset/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn export_value<T>(&self, pick: impl Fn(&ExportDefaults) -> Option<T>) -> Option<T> {
        self.repo
            .as_ref()
            .and_then(|r| r.export.as_ref())
            .and_then(&pick)
            .or_else(|| self.global.export.as_ref().and_then(&pick))
    }

    fn import_value<T>(&self, pick: impl Fn(&ImportDefaults) -> Option<T>) -> Option<T> {
        self.repo
            .as_ref()
            .and_then(|r| r.import.as_ref())
            .and_then(&pick)
            .or_else(|| self.global.import.as_ref().and_then(&pick))
    }

    /// Directory a series named `name` is exported to.
    ///
    /// Defaults to `patches/<name>`.
    pub fn export_dir(&self, name: &str) -> PathBuf {
        let base = self
            .export_value(|e| e.output_dir.clone())
            .unwrap_or_else(|| Self::DEFAULT_OUTPUT_DIR.to_string());
        PathBuf::from(base).join(name)
    }

    /// Whether export generates a cover letter.
    ///
    /// Defaults to `true`.
    pub fn export_cover_letter(&self) -> bool {
        self.export_value(|e| e.cover_letter).unwrap_or(true)
    }

    /// Whether import signs off applied patches.
    ///
    /// Defaults to `false`.
    pub fn import_signoff(&self) -> bool {
        self.import_value(|i| i.signoff).unwrap_or(false)
    }

    /// Revision imported series start from.
    ///
    /// Defaults to `HEAD`.
    pub fn import_start_point(&self) -> String {
        self.import_value(|i| i.start_point.clone())
            .unwrap_or_else(|| Self::DEFAULT_START_POINT.to_string())
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
