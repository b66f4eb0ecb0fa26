//! core
//!
//! Core domain types for patchset.
//!
//! # Modules
//!
//! - [`refs`] - Reference names parsed into patchset identities
//! - [`lineage`] - Grouping versions of one patchset under its latest
//! - [`covertags`] - One-shot snapshot of all cover tags
//! - [`cover`] - Cover letter text in tag messages
//! - [`version`] - `MAJOR.MINOR` versions
//! - [`backend`] - Query trait the reference model resolves through
//! - [`lazy`] - Memoized per-instance fields
//! - [`config`] - Configuration schema and loading
//! - [`error`] - Domain errors
//!
//! # Design Principles
//!
//! - Nothing here spawns processes or opens repositories
//! - Lookups go through [`backend::RefBackend`] and are cached per instance
//! - Failed lookups degrade to sentinels instead of aborting a listing

pub mod backend;
pub mod config;
pub mod cover;
pub mod covertags;
pub mod error;
pub mod lazy;
pub mod lineage;
pub mod refs;
pub mod version;
