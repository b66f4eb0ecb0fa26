//! core::covertags
//!
//! Batch snapshot of every patchset cover tag.
//!
//! Listing many patchsets would otherwise issue one peel query per branch.
//! The cache is loaded once per command invocation with a single backend
//! call and is never refreshed.

use std::collections::HashMap;

use super::backend::RefBackend;
use super::error::PatchsetError;

/// One cover tag entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverTag {
    /// Short id of the tag ref's own object.
    pub object: String,
    /// Short id of the commit the tag points at; absent for lightweight tags.
    pub target: Option<String>,
}

/// Read-only map from cover tag refname to [`CoverTag`].
#[derive(Debug, Clone, Default)]
pub struct CoverTagCache {
    tags: HashMap<String, CoverTag>,
}

impl CoverTagCache {
    /// Populate the cache with one listing query.
    pub fn load(backend: &dyn RefBackend) -> Result<Self, PatchsetError> {
        let tags = backend
            .list_cover_tags()?
            .into_iter()
            .map(|tag| {
                (
                    tag.refname,
                    CoverTag {
                        object: tag.object,
                        target: tag.target.filter(|t| !t.is_empty()),
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        log::debug!("loaded {} cover tags", tags.len());
        Ok(Self { tags })
    }

    pub fn get(&self, refname: &str) -> Option<&CoverTag> {
        self.tags.get(refname)
    }

    /// Commit targeted by the cover tag, if it exists and is annotated.
    pub fn target(&self, refname: &str) -> Option<&str> {
        self.tags.get(refname)?.target.as_deref()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
