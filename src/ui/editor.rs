//! ui::editor
//!
//! Launching the user's editor on a scratch file.
//!
//! The editor is looked up in order from `PATCHSET_TEST_EDITOR`,
//! `GIT_EDITOR`, `EDITOR` and finally git's `core.editor`. The value is a
//! shell snippet, so `EDITOR="code --wait"` works as it does for git.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::core::error::PatchsetError;
use crate::git::Git;

/// Environment variables consulted before `core.editor`, in order.
pub const EDITOR_VARS: [&str; 3] = ["PATCHSET_TEST_EDITOR", "GIT_EDITOR", "EDITOR"];

/// Pick the editor command.
///
/// # Errors
///
/// Returns [`PatchsetError::Other`] if nothing is configured.
pub fn find_editor(git: &Git) -> Result<String, PatchsetError> {
    lookup_editor(|var| std::env::var(var).ok(), || git.core_editor())
}

fn lookup_editor(
    env: impl Fn(&str) -> Option<String>,
    core_editor: impl FnOnce() -> Option<String>,
) -> Result<String, PatchsetError> {
    EDITOR_VARS
        .iter()
        .filter_map(|var| env(var))
        .chain(core_editor())
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| PatchsetError::other("Unable to find editor"))
}

/// Open `path` in `editor` and wait for it to exit.
///
/// Returns whether the file content differs afterwards.
pub fn edit_file(editor: &str, path: &Path) -> Result<bool, PatchsetError> {
    let before = fs::read(path).map_err(|e| {
        PatchsetError::other(format!("Failed to read {}: {}", path.display(), e))
    })?;

    log::debug!("running editor '{}' on {}", editor, path.display());
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(editor)
        .arg(path)
        .status()
        .map_err(|e| PatchsetError::other(format!("Failed to open editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(PatchsetError::other(format!(
            "Editor '{}' exited with {}",
            editor, status
        )));
    }

    let after = fs::read(path).map_err(|e| {
        PatchsetError::other(format!("Failed to read {}: {}", path.display(), e))
    })?;

    Ok(before != after)
}
