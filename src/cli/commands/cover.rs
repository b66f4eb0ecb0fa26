//! cover command - Edit the cover letter of a patchset
//!
//! The cover letter lives in the message of the version's cover tag. The
//! letter is opened in the editor and the tag rewritten only when it
//! changed, or when the tag is re-pointed with `--fix` / `--use-commit`.

use std::fs;

use anyhow::{bail, Context as _, Result};

use crate::cli::commands::resolve_patchref;
use crate::cli::Context;
use crate::core::cover::{cover_letter, DEFAULT_COVER_MESSAGE};
use crate::core::refs::{self, PatchRef, UNKNOWN_BASE};
use crate::git::Git;
use crate::ui::editor::{edit_file, find_editor};

/// Edit a cover letter.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Patchset (default: the current one)
/// * `fix` - Re-point the cover tag at the described base
/// * `use_commit` - Re-point the cover tag at this revision
pub fn cover(ctx: &Context, name: Option<&str>, fix: bool, use_commit: Option<&str>) -> Result<()> {
    let git = ctx.open_repo()?;
    let mut patchref = resolve_patchref(&git, name)?;

    let covertag = patchref.covertag();
    if covertag.is_empty() {
        bail!("{} has no cover tag", patchref.short_name());
    }

    let message = git
        .tag_message(&covertag)
        .context("Failed to read cover tag")?;
    let mut letter = message
        .as_deref()
        .map(cover_letter)
        .filter(|letter| !letter.is_empty())
        .unwrap_or_else(|| DEFAULT_COVER_MESSAGE.to_string());

    let (target, retarget) = if fix {
        let tip = patchref.object(&git).to_string();
        let mut described = refs::describe(&git, &tip)?;
        let target = described.object(&git).to_string();
        git.create_tag(&covertag, &target, &letter)
            .with_context(|| format!("Unable to update cover tag: {}", covertag))?;
        log::info!("Cover tag now points at {} ({})", target, described);
        (target, false)
    } else if let Some(rev) = use_commit {
        let target = git
            .resolve_commit(rev)
            .with_context(|| format!("Unknown revision: {}", rev))?;
        (target, true)
    } else {
        let target = current_target(&git, &mut patchref, message.is_some(), &covertag)?;
        (target, false)
    };

    let editor = find_editor(&git)?;
    let file = tempfile::Builder::new()
        .prefix("patchset-cover-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temporary file")?;
    fs::write(file.path(), &letter).context("Failed to write cover letter")?;

    let changed = edit_file(&editor, file.path())?;
    if changed {
        letter = fs::read_to_string(file.path())
            .context("Failed to read cover letter")?
            .trim()
            .to_string();
    }

    if changed || retarget {
        git.create_tag(&covertag, &target, &letter)
            .with_context(|| format!("Unable to update cover tag: {}", covertag))?;
    }

    if changed {
        log::warn!("Cover message has been updated.");
    } else {
        log::warn!("Cover message has not changed.");
    }

    Ok(())
}

/// Where the cover tag points now, or the detected base for a new tag.
fn current_target(
    git: &Git,
    patchref: &mut PatchRef,
    tag_exists: bool,
    covertag: &str,
) -> Result<String> {
    if tag_exists {
        return Ok(format!("{}^{{}}", covertag));
    }

    let base = patchref.patch_base(git, None).to_string();
    if base == UNKNOWN_BASE {
        bail!(
            "Unable to find the base of {}; use --use-commit",
            patchref.short_name()
        );
    }
    Ok(base)
}
