//! remove command - Delete patchsets
//!
//! Every matching version is removed together with its cover tag, older
//! versions first. `remove foo` drops all of `patchset/foo/*`;
//! `remove patchset/foo/v1.0` only that version.
//!
//! The checked-out branch is never deleted.

use anyhow::{bail, Context as _, Result};

use crate::cli::commands::qualify;
use crate::cli::Context;
use crate::core::error::PatchsetError;
use crate::core::lineage::{list_patchrefs, Lineage, BRANCH_NAMESPACE};
use crate::core::refs::PatchRef;
use crate::git::Git;

/// Remove patchsets.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `names` - Patchset names or refs
pub fn remove(ctx: &Context, names: &[String]) -> Result<()> {
    let git = ctx.open_repo()?;
    let current = git.current_branch().context("Failed to read HEAD")?;

    let mut failed = 0;
    for name in names {
        if name.is_empty() {
            bail!("Empty branch name is not allowed.");
        }
        let patchref = PatchRef::parse(&qualify(name))?;

        let lineage = list_patchrefs(&git, &pattern_for(&patchref))?;
        if lineage.is_empty() {
            log::warn!("No such patchset: {}", name);
            failed += 1;
            continue;
        }

        if let Some(current) = current.as_deref() {
            if contains_ref(&lineage, current) {
                log::warn!("Cowardly refuse to delete the current branch.");
                failed += 1;
                continue;
            }
        }

        for victim in removal_order(lineage) {
            if let Err(err) = delete_patchref(&git, &victim) {
                log::warn!("{}", err);
                failed += 1;
                break;
            }
            if !ctx.quiet {
                println!("Deleted {}", victim.short_name());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} patchsets could not be removed", failed, names.len());
    }
    Ok(())
}

/// The ref pattern selecting what `patchref` names.
fn pattern_for(patchref: &PatchRef) -> String {
    let mut pattern = format!("{}{}", BRANCH_NAMESPACE, patchref.patch_name());
    if !patchref.patch_vers().is_empty() {
        pattern.push('/');
        pattern.push_str(&patchref.version_key());
    }
    pattern
}

fn contains_ref(lineage: &Lineage, fullname: &str) -> bool {
    lineage.values().any(|latest| {
        latest.fullname() == fullname
            || latest.prev_vers.values().any(|older| older.fullname() == fullname)
    })
}

/// Older versions first, then the latest, patchset by patchset.
fn removal_order(lineage: Lineage) -> Vec<PatchRef> {
    let mut order = Vec::new();
    for (_, mut latest) in lineage {
        order.extend(std::mem::take(&mut latest.prev_vers).into_values());
        order.push(latest);
    }
    order
}

fn delete_patchref(git: &Git, patchref: &PatchRef) -> Result<(), PatchsetError> {
    git.delete_branch(&patchref.fullname())
        .map_err(|e| PatchsetError::PatchRef(e.to_string()))?;

    let covertag = patchref.covertag();
    if !covertag.is_empty() {
        if let Err(err) = git.delete_tag(&covertag) {
            log::warn!("{}", err);
        }
    }
    Ok(())
}
