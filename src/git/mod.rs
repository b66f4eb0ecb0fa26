//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module imports `git2` or spawns the
//! `git` binary.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Answering [`crate::core::backend::RefBackend`] queries
//! - Branch and cover tag creation/deletion
//! - Recipient config reads and writes
//! - Porcelain: `switch`, `describe`, `format-patch`, `am`, `send-email`
//!
//! # Example
//!
//! ```ignore
//! use patchset::core::backend::RefBackend;
//! use patchset::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let refs = git.list_refs("refs/heads/patchset/")?;
//! ```

mod interface;

pub use interface::{Git, GitError};
