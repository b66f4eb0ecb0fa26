//! cli
//!
//! Command-line interface layer for patchset.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Open the repository and configuration for a command
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`commands`]. Handlers reach git only through [`crate::git::Git`] and
//! read reference state through the [`crate::core`] model.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::git::Git;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Quiet mode (only errors).
    pub quiet: bool,
}

impl Context {
    /// The directory commands operate in.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Open the repository containing the working directory.
    pub fn open_repo(&self) -> Result<Git> {
        let cwd = self.cwd()?;
        let git = Git::open(&cwd).context("Failed to open repository")?;
        log::debug!("repository at {}", git.work_dir().display());
        Ok(git)
    }

    /// Load global and repository configuration, logging any warnings.
    pub fn load_config(&self, git: &Git) -> Result<Config> {
        let loaded = Config::load(Some(git.git_dir())).context("Failed to load config")?;
        for warning in &loaded.warnings {
            log::warn!("{}: {}", warning.path.display(), warning.message);
        }
        let config = loaded.config;
        for path in [
            config.global_config_loaded_from(),
            config.repo_config_loaded_from(),
        ]
        .into_iter()
        .flatten()
        {
            log::debug!("Loaded config from {}", path.display());
        }
        Ok(config)
    }
}

/// Run the CLI application with already parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        cwd: cli.cwd.clone(),
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
