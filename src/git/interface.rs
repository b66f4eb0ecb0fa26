//! git::interface
//!
//! Git interface implementation.
//!
//! This module provides the **single doorway** to all Git operations in
//! patchset. Reads and plumbing-level writes go through `git2`. Porcelain
//! that libgit2 does not provide (`switch`, `describe`, `format-patch`,
//! `am`, `send-email`) runs the `git` binary with the repository's work
//! tree as its working directory. The process itself never changes
//! directory.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::CommandFailed`]: A `git` subprocess exited non-zero
//! - [`GitError::Spawn`]: The `git` binary could not be started
//!
//! # Example
//!
//! ```ignore
//! use patchset::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(branch) = git.current_branch()? {
//!     println!("on {}", branch);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::core::backend::{ListedRef, ListedTag, RefBackend};
use crate::core::error::PatchsetError;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {spec}")]
    ObjectNotFound {
        /// The revision expression that did not resolve
        spec: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// A `git` subprocess failed.
    #[error("{command} failed: {stderr}")]
    CommandFailed {
        /// The command line, for display
        command: String,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The `git` binary could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// The command line, for display
        command: String,
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        spec: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<GitError> for PatchsetError {
    fn from(err: GitError) -> Self {
        PatchsetError::Other(err.to_string())
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2` or spawns `git`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Working directory every spawned `git` runs in
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(Self { repo, work_dir })
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The work tree every spawned `git` runs in.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    // =========================================================================
    // Subprocesses
    // =========================================================================

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("--no-pager").args(args).current_dir(&self.work_dir);
        cmd
    }

    fn display(args: &[&str]) -> String {
        format!("git {}", args.join(" "))
    }

    /// Run `git <args>` and capture its standard output.
    ///
    /// # Errors
    ///
    /// - [`GitError::Spawn`] if `git` cannot be started
    /// - [`GitError::CommandFailed`] if it exits non-zero
    pub fn run(&self, args: &[&str]) -> Result<String, GitError> {
        log::debug!("running {}", Self::display(args));

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: Self::display(args),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: Self::display(args),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run `git <args>` attached to the terminal.
    pub fn run_interactive(&self, args: &[&str]) -> Result<(), GitError> {
        log::debug!("running {}", Self::display(args));

        let status = self
            .command(args)
            .status()
            .map_err(|source| GitError::Spawn {
                command: Self::display(args),
                source,
            })?;

        if !status.success() {
            return Err(GitError::CommandFailed {
                command: Self::display(args),
                stderr: format!("exit status {}", status.code().unwrap_or(-1)),
            });
        }

        Ok(())
    }

    /// Whether `git --list-cmds=main` knows `name`.
    pub fn has_command(&self, name: &str) -> bool {
        self.run(&["--list-cmds=main"])
            .map(|out| out.lines().any(|line| line.trim() == name))
            .unwrap_or(false)
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    fn short_oid(&self, oid: git2::Oid) -> Option<String> {
        let object = self.repo.find_object(oid, None).ok()?;
        let short = object.short_id().ok()?;
        short.as_str().map(String::from)
    }

    /// Resolve a revision expression to its full commit id.
    pub fn resolve_commit(&self, spec: &str) -> Result<String, GitError> {
        let commit = self
            .repo
            .revparse_single(spec)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, spec))?;
        Ok(commit.id().to_string())
    }

    /// Full name of the branch HEAD points at (`refs/heads/...`).
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            return Ok(head.name().map(String::from));
        }

        Ok(None)
    }

    // =========================================================================
    // Branch and Tag Mutation
    // =========================================================================

    /// Create `branch` at `start_point` (default HEAD) and switch to it.
    pub fn switch_create(&self, branch: &str, start_point: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["switch", "--create", branch];
        if let Some(start) = start_point {
            args.push(start);
        }
        self.run(&args)?;
        log::info!("Switched to a new branch '{}'", branch);
        Ok(())
    }

    /// Create or replace an annotated tag.
    ///
    /// `name` may be given with or without `refs/tags/`. The tag points at
    /// the commit `target` peels to.
    pub fn create_tag(&self, name: &str, target: &str, message: &str) -> Result<(), GitError> {
        let name = name.strip_prefix("refs/tags/").unwrap_or(name);

        let object = self
            .repo
            .revparse_single(target)
            .and_then(|obj| obj.peel(git2::ObjectType::Commit))
            .map_err(|e| GitError::from_git2(e, target))?;
        let tagger = self.repo.signature()?;

        self.repo
            .tag(name, &object, &tagger, message, true)
            .map_err(|e| GitError::from_git2(e, name))?;

        log::info!("Created tag '{}'", name);
        Ok(())
    }

    /// The message of an annotated tag, or `None` if there is no such tag.
    pub fn tag_message(&self, refname: &str) -> Result<Option<String>, GitError> {
        let reference = match self.repo.find_reference(refname) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };

        match reference.peel_to_tag() {
            Ok(tag) => Ok(tag.message().map(String::from)),
            Err(_) => Ok(None),
        }
    }

    /// Delete a tag; `name` may carry the `refs/tags/` prefix.
    pub fn delete_tag(&self, name: &str) -> Result<(), GitError> {
        let name = name.strip_prefix("refs/tags/").unwrap_or(name);
        self.repo
            .tag_delete(name)
            .map_err(|e| GitError::from_git2(e, &format!("refs/tags/{name}")))
    }

    /// Delete a local branch. Refuses the checked-out branch.
    pub fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        let name = name.strip_prefix("refs/heads/").unwrap_or(name);
        let mut branch = self
            .repo
            .find_branch(name, git2::BranchType::Local)
            .map_err(|e| GitError::from_git2(e, &format!("refs/heads/{name}")))?;
        branch
            .delete()
            .map_err(|e| GitError::from_git2(e, name))?;
        log::info!("Deleted branch {}", name);
        Ok(())
    }

    // =========================================================================
    // Config
    // =========================================================================

    /// Every value of a multi-valued config variable, in file order.
    pub fn config_get_all(&self, name: &str) -> Result<Vec<String>, GitError> {
        let config = self.repo.config()?.snapshot()?;
        let mut values = Vec::new();

        let mut entries = match config.multivar(name, None) {
            Ok(entries) => entries,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(values),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let Some(value) = entry.value() {
                values.push(value.to_string());
            }
        }

        Ok(values)
    }

    /// Replace every value of `name` in the repository config.
    ///
    /// An empty `values` just unsets the variable.
    pub fn config_replace_all(&self, name: &str, values: &[String]) -> Result<(), GitError> {
        let mut config = self.repo.config()?.open_level(git2::ConfigLevel::Local)?;

        match config.remove_multivar(name, ".*") {
            Ok(()) => {}
            Err(e) if e.code() == git2::ErrorCode::NotFound => {}
            Err(e) => return Err(GitError::from_git2(e, name)),
        }

        for value in values {
            config
                .set_multivar(name, "$^", value)
                .map_err(|e| GitError::from_git2(e, name))?;
        }

        Ok(())
    }

    /// Read a standalone git-config formatted file as `(name, value)` pairs.
    pub fn read_config_file(path: &Path) -> Result<Vec<(String, String)>, GitError> {
        let config = git2::Config::open(path)?;
        let mut pairs = Vec::new();

        let mut entries = config.entries(None)?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                pairs.push((name.to_string(), value.to_string()));
            }
        }

        Ok(pairs)
    }

    /// `core.editor`, if configured.
    pub fn core_editor(&self) -> Option<String> {
        self.repo.config().ok()?.get_string("core.editor").ok()
    }

    // =========================================================================
    // Porcelain
    // =========================================================================

    /// `git format-patch <args>`; git's own output is returned.
    pub fn format_patch(&self, args: &[&str]) -> Result<String, GitError> {
        let mut full = vec!["format-patch"];
        full.extend_from_slice(args);
        self.run(&full)
    }

    /// Apply mailbox files in order with `git am`.
    pub fn am(&self, files: &[PathBuf], signoff: bool) -> Result<String, GitError> {
        let mut args = vec![
            "am".to_string(),
            "--empty=drop".to_string(),
            "--ignore-space-change".to_string(),
            "--reject".to_string(),
        ];
        if signoff {
            args.push("--signoff".to_string());
        }
        args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args)
    }
}

impl RefBackend for Git {
    fn short_id(&self, spec: &str) -> Option<String> {
        let object = self.repo.revparse_single(spec).ok()?;
        let short = object.short_id().ok()?;
        short.as_str().map(String::from)
    }

    fn describe(&self, spec: &str) -> Option<String> {
        let out = self
            .run(&[
                "describe",
                "--all",
                "--abbrev=0",
                "--exclude=patchset/*",
                spec,
            ])
            .map_err(|e| log::debug!("{}", e))
            .ok()?;
        out.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from)
    }

    fn count_commits(&self, base: &str, tip: &str) -> Option<usize> {
        let base = self.repo.revparse_single(base).ok()?.peel_to_commit().ok()?;
        let tip = self.repo.revparse_single(tip).ok()?.peel_to_commit().ok()?;

        let mut revwalk = self.repo.revwalk().ok()?;
        revwalk.push(tip.id()).ok()?;
        revwalk.hide(base.id()).ok()?;

        Some(revwalk.count())
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<ListedRef>, PatchsetError> {
        let pattern = format!("{}*", prefix);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(GitError::from)?;

        let mut entries = Vec::new();
        for reference in refs {
            let reference = reference.map_err(GitError::from)?;

            // Skip refs with non-UTF8 names
            let Some(name) = reference.name() else {
                continue;
            };
            let Some(object) = reference.target().and_then(|oid| self.short_oid(oid)) else {
                continue;
            };

            entries.push(ListedRef::new(object, name));
        }

        Ok(entries)
    }

    fn list_cover_tags(&self) -> Result<Vec<ListedTag>, PatchsetError> {
        let refs = self
            .repo
            .references_glob("refs/tags/patchset/*")
            .map_err(GitError::from)?;

        let mut tags = Vec::new();
        for reference in refs {
            let reference = reference.map_err(GitError::from)?;

            let Some(name) = reference.name() else {
                continue;
            };
            if !name.ends_with("/cover") {
                continue;
            }
            let Some(oid) = reference.target() else {
                continue;
            };
            let Some(object) = self.short_oid(oid) else {
                continue;
            };

            // Only annotated tags dereference to a commit.
            let target = match self.repo.find_tag(oid) {
                Ok(tag) => tag
                    .target()
                    .ok()
                    .and_then(|obj| obj.peel_to_commit().ok())
                    .and_then(|commit| self.short_oid(commit.id())),
                Err(_) => None,
            };

            tags.push(ListedTag {
                refname: name.to_string(),
                object,
                target,
            });
        }

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn error_display_formatting() {
            let err = GitError::RefNotFound {
                refname: "refs/heads/main".to_string(),
            };
            assert_eq!(err.to_string(), "ref not found: refs/heads/main");

            let err = GitError::CommandFailed {
                command: "git am".to_string(),
                stderr: "patch does not apply".to_string(),
            };
            assert_eq!(err.to_string(), "git am failed: patch does not apply");
        }

        #[test]
        fn not_found_context_picks_variant() {
            let raw = git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Reference,
                "missing",
            );
            assert!(matches!(
                GitError::from_git2(raw, "refs/tags/x"),
                GitError::RefNotFound { .. }
            ));

            let raw = git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Object,
                "missing",
            );
            assert!(matches!(
                GitError::from_git2(raw, "HEAD~9"),
                GitError::ObjectNotFound { .. }
            ));
        }

        #[test]
        fn converts_into_domain_error() {
            let err: PatchsetError = GitError::BareRepo.into();
            assert_eq!(
                err,
                PatchsetError::Other("bare repository not supported".to_string())
            );
        }
    }

    #[test]
    fn open_outside_repo_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        // A fresh temp dir is not inside any repository unless TMPDIR is.
        if git2::Repository::discover(temp.path()).is_err() {
            assert!(matches!(
                Git::open(temp.path()),
                Err(GitError::NotARepo { .. })
            ));
        }
    }
}
