//! core::lineage
//!
//! Groups a flat ref listing into one entry per patchset name.
//!
//! # Overview
//!
//! The newest version of each patchset is the entry; every older version
//! sits in its `prev_vers`, flattened to a single level. Input order does
//! not matter.
//!
//! # Example
//!
//! ```
//! use patchset::core::backend::ListedRef;
//! use patchset::core::lineage::build_lineage;
//!
//! let lineage = build_lineage(vec![
//!     ListedRef::new("aaaaaaa", "refs/heads/patchset/foo/v1.0"),
//!     ListedRef::new("bbbbbbb", "refs/heads/patchset/foo/v2.0"),
//! ]);
//!
//! let foo = &lineage["foo"];
//! assert_eq!(foo.patch_vers(), "2.0");
//! assert!(foo.prev_vers.contains_key("v1.0"));
//! ```

use std::collections::BTreeMap;

use super::backend::{ListedRef, RefBackend};
use super::error::PatchsetError;
use super::refs::PatchRef;

/// Namespace every patchset branch lives under.
pub const BRANCH_NAMESPACE: &str = "refs/heads/patchset/";

/// Patchset name to latest version.
pub type Lineage = BTreeMap<String, PatchRef>;

/// Match a refname against a `git for-each-ref` style pattern.
///
/// - empty pattern matches everything
/// - a trailing `/` matches by prefix
/// - otherwise an exact match or a leading path component match
pub fn ref_matches(pattern: &str, refname: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    if pattern.ends_with('/') {
        return refname.starts_with(pattern);
    }
    match refname.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Fold a listing into a [`Lineage`].
///
/// Entries that are not patchset refs are skipped.
pub fn build_lineage(refs: impl IntoIterator<Item = ListedRef>) -> Lineage {
    let mut latest = Lineage::new();

    for listed in refs {
        let mut patchref = match PatchRef::parse(&listed.refname) {
            Ok(r) => r,
            Err(err) => {
                log::debug!("skipping {}: {}", listed.refname, err);
                continue;
            }
        };
        patchref.set_object(listed.object);

        let name = patchref.patch_name().to_string();
        let Some(mut current) = latest.remove(&name) else {
            latest.insert(name, patchref);
            continue;
        };

        let promoted = if patchref.version() > current.version() {
            patchref.prev_vers = std::mem::take(&mut current.prev_vers);
            patchref.prev_vers.insert(current.version_key(), current);
            patchref
        } else {
            current
                .prev_vers
                .insert(patchref.version_key(), patchref);
            current
        };
        latest.insert(name, promoted);
    }

    latest
}

/// List patchset branches matching `pattern` and fold them into a lineage.
///
/// The pattern applies to full refnames, e.g. `refs/heads/patchset/foo/`.
pub fn list_patchrefs(
    backend: &dyn RefBackend,
    pattern: &str,
) -> Result<Lineage, PatchsetError> {
    let refs = backend
        .list_refs(BRANCH_NAMESPACE)?
        .into_iter()
        .filter(|r| ref_matches(pattern, &r.refname));

    Ok(build_lineage(refs))
}

/// Pattern selecting every version of the patchset `name`.
pub fn name_pattern(name: &str) -> String {
    format!("{}{}/", BRANCH_NAMESPACE, name)
}
