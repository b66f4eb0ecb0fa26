//! import command - Turn a mailing list thread into a patchset
//!
//! The mailboxes must hold exactly one conversation. Its root message
//! becomes the cover letter and the patches below it are applied with
//! `git am` in thread order:
//!
//! 1. create `patchset/<name>/v<N>.0` at the start point, where `N` comes
//!    from the `vN` in the root subject
//! 2. tag the start point as the cover tag
//! 3. apply the patches

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::Context;
use crate::core::refs::{PatchRef, PatchType};
use crate::mail::subject::subject_version;
use crate::mail::threads_from_files;

/// Flags of `patchset import`.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub name: Option<String>,
    pub start_point: Option<String>,
    pub signoff: bool,
    pub print_tree: bool,
}

/// Import a patch series from mailboxes.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `mboxes` - Mailbox files, read in order
/// * `opts` - Import flags
pub fn import(ctx: &Context, mboxes: &[PathBuf], opts: ImportOptions) -> Result<()> {
    let nodes = threads_from_files(mboxes).context("Failed to read mailboxes")?;

    if opts.print_tree {
        print!("{}", nodes.render_tree());
        return Ok(());
    }

    let name = opts
        .name
        .as_deref()
        .ok_or_else(|| anyhow!("--name is required to import"))?;
    if name.is_empty() {
        bail!("Empty branch name is not allowed.");
    }

    let roots = nodes.root_nodes();
    if roots.len() != 1 {
        bail!("too many conversations in the file list: {}", roots.len());
    }
    let root = roots[0];

    let patches = nodes.patches(root);
    if patches.is_empty() {
        bail!("no patches found to apply");
    }

    let version = subject_version(root.subject().unwrap_or_default());
    let patchref = PatchRef::for_version(name, PatchType::Draft, version)?;
    let branch = patchref.branch_name();

    let git = ctx.open_repo()?;
    let config = ctx.load_config(&git)?;
    let start_point = opts
        .start_point
        .clone()
        .unwrap_or_else(|| config.import_start_point());
    let signoff = opts.signoff || config.import_signoff();

    git.switch_create(&branch, Some(&start_point))
        .with_context(|| format!("Unable to create new branch: {}", branch))?;
    git.create_tag(&patchref.covertag(), "HEAD^{}", &root.cover_text())
        .with_context(|| format!("Unable to create cover tag: {}/cover", branch))?;

    let dir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let mut files = Vec::with_capacity(patches.len());
    for (num, message) in patches.iter().enumerate() {
        let path = dir.path().join(format!("{}.patch", num + 1));
        message.write_to(&path)?;
        files.push(path);
    }
    log::debug!("applying {} patches onto {}", files.len(), branch);

    let out = git.am(&files, signoff).context("git am failed")?;
    for line in out.lines().filter(|l| !l.trim().is_empty()) {
        log::warn!("{}", line);
    }

    if !ctx.quiet {
        println!("Imported {} patches into {}", files.len(), branch);
    }
    Ok(())
}
