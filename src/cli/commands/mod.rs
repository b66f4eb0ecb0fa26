//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Resolves the patchset it works on through the reference model
//! 3. Drives git through [`Git`] and reports the result
//!
//! Handlers return `anyhow::Result`; `main` turns errors into the exit code.

mod completion;
mod config_cmd;
mod cover;
mod create;
mod export;
mod import;
mod list;
mod remove;
mod send;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::config;
pub use cover::cover;
pub use create::create;
pub use export::{export, ExportOptions};
pub use import::{import, ImportOptions};
pub use list::list;
pub use remove::remove;
pub use send::send;

use anyhow::{anyhow, Context as _, Result};

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::lineage::{list_patchrefs, name_pattern};
use crate::core::refs::{PatchRef, PATCHSET_PREFIX};
use crate::git::Git;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::List { versions, archived } => list::list(ctx, versions, archived),
        Command::Create {
            name,
            number,
            next,
            increment,
        } => create::create(ctx, name.as_deref(), number.as_deref(), next, increment),
        Command::Remove { names } => remove::remove(ctx, &names),
        Command::Config { name } => config_cmd::config(ctx, name.as_deref()),
        Command::Cover {
            name,
            fix,
            use_commit,
        } => cover::cover(ctx, name.as_deref(), fix, use_commit.as_deref()),
        Command::Export {
            name,
            rfc,
            resend,
            in_reply_to,
            output_directory,
        } => export::export(
            ctx,
            name.as_deref(),
            export::ExportOptions {
                rfc,
                resend,
                in_reply_to,
                output_directory,
            },
        ),
        Command::Send { files } => send::send(ctx, &files),
        Command::Import {
            name,
            start_point,
            signoff,
            print_tree,
            mboxes,
        } => import::import(
            ctx,
            &mboxes,
            import::ImportOptions {
                name,
                start_point,
                signoff,
                print_tree,
            },
        ),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Prefix a bare patchset name with `patchset/`.
///
/// Anything that already names a ref is returned unchanged.
pub(crate) fn qualify(name: &str) -> String {
    if name.starts_with(PATCHSET_PREFIX) || name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("{}{}", PATCHSET_PREFIX, name)
    }
}

/// The patchset checked out in the working tree.
pub(crate) fn current_patchref(git: &Git) -> Result<PatchRef> {
    let branch = git
        .current_branch()
        .context("Failed to read HEAD")?
        .ok_or_else(|| anyhow!("HEAD is not on a branch"))?;

    Ok(PatchRef::parse(&branch)?)
}

/// Resolve a command's patchset argument.
///
/// - no argument: the checked-out patchset
/// - a ref with a version: that exact version
/// - a bare name or `patchset/<name>`: its latest version
pub(crate) fn resolve_patchref(git: &Git, name: Option<&str>) -> Result<PatchRef> {
    let Some(name) = name else {
        return current_patchref(git);
    };
    if name.is_empty() {
        return Err(anyhow!("Empty branch name is not allowed."));
    }

    let patchref = PatchRef::parse(&qualify(name))?;
    if !patchref.patch_vers().is_empty() {
        return Ok(patchref);
    }

    let mut lineage = list_patchrefs(git, &name_pattern(patchref.patch_name()))?;
    lineage
        .remove(patchref.patch_name())
        .ok_or_else(|| anyhow!("No such patchset: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_names() {
        assert_eq!(qualify("foo"), "patchset/foo");
        assert_eq!(qualify("patchset/foo/v1.0"), "patchset/foo/v1.0");
        assert_eq!(qualify("refs/heads/patchset/foo"), "refs/heads/patchset/foo");
    }
}
