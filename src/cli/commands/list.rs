//! list command - Show patchsets with their base, tip and size
//!
//! One line per patchset, latest version only:
//!
//! ```text
//! > 1a2b3c4..5d6e7f8       3 patchset/foo/v2.0
//!   0a1b2c3..4d5e6f7      12 patchset/bar/v1.0
//! ```
//!
//! `>` marks the checked-out branch. With `--versions` the older versions
//! follow their latest, newest first and indented.

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::backend::RefBackend;
use crate::core::covertags::CoverTagCache;
use crate::core::lineage::{list_patchrefs, Lineage, BRANCH_NAMESPACE};
use crate::core::refs::PatchRef;

/// List patchsets.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `versions` - Also show older versions
/// * `archived` - Show archived patchsets instead of active ones
pub fn list(ctx: &Context, versions: bool, archived: bool) -> Result<()> {
    let git = ctx.open_repo()?;

    let cache = load_cover_tags(&git);
    let current = git.current_branch().context("Failed to read HEAD")?;
    let mut lineage = list_patchrefs(&git, BRANCH_NAMESPACE)?;

    for line in render(
        &mut lineage,
        &git,
        cache.as_ref(),
        current.as_deref(),
        versions,
        archived,
    ) {
        println!("{}", line);
    }

    Ok(())
}

/// The cover tag index, or `None` to resolve every base on its own.
fn load_cover_tags(backend: &dyn RefBackend) -> Option<CoverTagCache> {
    match CoverTagCache::load(backend) {
        Ok(cache) => Some(cache),
        Err(err) => {
            log::warn!("Unable to list cover tags: {}", err);
            None
        }
    }
}

fn render(
    lineage: &mut Lineage,
    backend: &dyn RefBackend,
    cache: Option<&CoverTagCache>,
    current: Option<&str>,
    versions: bool,
    archived: bool,
) -> Vec<String> {
    let mut lines = Vec::new();

    for patchref in lineage.values_mut() {
        if patchref.archived() != archived {
            continue;
        }

        lines.push(format_line(patchref, backend, cache, current, 7, ""));

        if !versions {
            continue;
        }
        for older in patchref.prev_vers.values_mut().rev() {
            lines.push(format_line(older, backend, cache, current, 5, "  "));
        }
    }

    lines
}

fn format_line(
    patchref: &mut PatchRef,
    backend: &dyn RefBackend,
    cache: Option<&CoverTagCache>,
    current: Option<&str>,
    width: usize,
    indent: &str,
) -> String {
    let mark = if current == Some(patchref.fullname().as_str()) {
        ">"
    } else {
        " "
    };
    let base = patchref.patch_base(backend, cache).to_string();
    let object = patchref.object(backend).to_string();
    let count = patchref.count(backend, cache).to_string();

    format!(
        "{} {}{}..{} {:>width$} {}",
        mark,
        indent,
        base,
        object,
        count,
        patchref.short_name(),
        width = width
    )
}
