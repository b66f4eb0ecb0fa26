//! send command - Hand exported mail files to git send-email

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::cli::Context;

/// Arguments passed to `git send-email` ahead of the files.
///
/// Recipients come from the `--to`/`--cc` headers written by `export`, so
/// an empty `--to` keeps send-email from prompting for one.
const SEND_EMAIL_ARGS: [&str; 6] = [
    "send-email",
    "--to",
    " ",
    "--confirm=always",
    "--format-patch",
    "--suppress-from",
];

/// Send mail files.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `files` - Files produced by `patchset export`
pub fn send(ctx: &Context, files: &[PathBuf]) -> Result<()> {
    let git = ctx.open_repo()?;

    if !git.has_command("send-email") {
        log::warn!("git-send-email(1) not found.");
        bail!("git send-email is not available");
    }

    // git runs in the work tree, so relative paths are anchored here
    let files = anchor_paths(&ctx.cwd()?, files);
    let mut args: Vec<&str> = SEND_EMAIL_ARGS.to_vec();
    args.extend(files.iter().map(String::as_str));

    git.run_interactive(&args)?;
    Ok(())
}

/// `files` with relative paths joined onto `base`.
fn anchor_paths(base: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            if file.is_relative() {
                base.join(file)
            } else {
                file.clone()
            }
        })
        .map(|file| file.to_string_lossy().into_owned())
        .collect()
}
