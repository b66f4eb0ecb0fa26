//! core::backend
//!
//! The query capability the reference model resolves lazy fields through.
//!
//! The core never talks to git directly. [`crate::git::Git`] implements
//! [`RefBackend`] for real repositories; tests use an in-memory fake.

use super::error::PatchsetError;

/// A ref listed under a namespace, as `(short object id, full refname)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRef {
    pub object: String,
    pub refname: String,
}

impl ListedRef {
    pub fn new(object: impl Into<String>, refname: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            refname: refname.into(),
        }
    }
}

/// A cover tag as returned by the batch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTag {
    /// Full refname (`refs/tags/patchset/<name>/<type><vers>/cover`).
    pub refname: String,
    /// Short id of the tag ref's own object.
    pub object: String,
    /// Short id of the dereferenced commit, for annotated tags.
    pub target: Option<String>,
}

/// Read-only queries against the revision-control backend.
///
/// Resolution queries return `None` when the backend cannot answer; callers
/// turn that into sentinel values rather than errors.
pub trait RefBackend {
    /// Short object id for a revision expression (`rev-parse --short`).
    fn short_id(&self, spec: &str) -> Option<String>;

    /// Nearest ref describing `spec`, ignoring `patchset/*` refs.
    ///
    /// Returns the raw output of `git describe --all`, e.g. `heads/main`.
    fn describe(&self, spec: &str) -> Option<String>;

    /// Number of commits reachable from `tip` but not from `base`.
    fn count_commits(&self, base: &str, tip: &str) -> Option<usize>;

    /// Every ref whose name starts with `prefix`, in backend order.
    fn list_refs(&self, prefix: &str) -> Result<Vec<ListedRef>, PatchsetError>;

    /// Every tag matching `refs/tags/patchset/*/cover`.
    fn list_cover_tags(&self) -> Result<Vec<ListedTag>, PatchsetError>;
}
