//! patchset - versioned patch series on top of git
//!
//! A patchset is a named series of commits kept as a branch
//! `patchset/<name>/v<major>.<minor>` plus an annotated cover tag
//! `patchset/<name>/v<major>.<minor>/cover`. The tag's message is the cover
//! letter and its target is the commit the series starts from.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, runs commands)
//! - [`core`] - Reference model, version lineage and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`mail`] - Mailbox parsing and thread reconstruction for import
//! - [`ui`] - Editor integration
//!
//! # Invariants
//!
//! 1. The core reads repository state only through [`core::backend::RefBackend`]
//! 2. Every process is spawned in the repository's work tree, never by
//!    changing the current directory
//! 3. A listing never fails because one ref cannot be resolved

pub mod cli;
pub mod core;
pub mod git;
pub mod mail;
pub mod ui;
