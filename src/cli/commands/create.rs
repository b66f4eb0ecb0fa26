//! create command - Start a patchset or a new version of the current one
//!
//! A new version is a branch `patchset/<name>/v<major>.<minor>` created at
//! HEAD plus its cover tag, also at HEAD. When the version is derived from
//! the checked-out patchset, the cover letter is carried over.

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::commands::current_patchref;
use crate::cli::Context;
use crate::core::cover::{cover_letter, DEFAULT_COVER_MESSAGE};
use crate::core::refs::{PatchRef, PatchType};
use crate::core::version::Version;

/// How the version of the new branch is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bump {
    Major,
    Minor,
}

/// Create a new patchset version and switch to it.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Name for the new patchset (default: the current one)
/// * `number` - Explicit version
/// * `next` - Bump the current major version
/// * `increment` - Bump the current minor version
pub fn create(
    ctx: &Context,
    name: Option<&str>,
    number: Option<&str>,
    next: bool,
    increment: bool,
) -> Result<()> {
    let git = ctx.open_repo()?;

    let bump = match (next, increment) {
        (true, _) => Some(Bump::Major),
        (false, true) => Some(Bump::Minor),
        _ => None,
    };

    let (name, version, cover) = match name {
        Some(name) => {
            let version = match number {
                Some(n) => Version::normalize(n)?,
                None => Version::INITIAL,
            };
            (name.to_string(), version, DEFAULT_COVER_MESSAGE.to_string())
        }
        None => {
            let current = current_patchref(&git)?;
            let current_version = current
                .version()
                .ok_or_else(|| anyhow!("{} has no version", current.short_name()))?;
            let version = next_version(current_version, bump, number)?;

            let cover = git
                .tag_message(&current.covertag())
                .context("Failed to read cover tag")?
                .map(|message| cover_letter(&message))
                .filter(|letter| !letter.is_empty())
                .unwrap_or_else(|| DEFAULT_COVER_MESSAGE.to_string());

            (current.patch_name().to_string(), version, cover)
        }
    };

    if name.is_empty() {
        bail!("Empty branch name is not allowed.");
    }

    let patchref = PatchRef::for_version(&name, PatchType::Draft, version)?;
    let branch = patchref.branch_name();

    git.switch_create(&branch, None)
        .with_context(|| format!("Unable to create new branch: {}", branch))?;
    git.create_tag(&patchref.covertag(), "HEAD^{}", &cover)
        .with_context(|| format!("Unable to create cover tag: {}/cover", branch))?;

    log::info!("New patchset created: '{}'", branch);
    if !ctx.quiet {
        println!("Created {}", branch);
    }

    Ok(())
}

fn next_version(current: Version, bump: Option<Bump>, number: Option<&str>) -> Result<Version> {
    match (bump, number) {
        (Some(Bump::Major), _) => Ok(current.next_major()),
        (Some(Bump::Minor), _) => Ok(current.next_minor()),
        (None, Some(n)) => Ok(Version::normalize(n)?),
        (None, None) => bail!("It's not clear what you want to achieve."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u64, minor: u64) -> Version {
        Version::new(major, minor)
    }

    #[test]
    fn bumps() {
        assert_eq!(next_version(v(1, 2), Some(Bump::Major), None).unwrap(), v(2, 0));
        assert_eq!(next_version(v(1, 2), Some(Bump::Minor), None).unwrap(), v(1, 3));
    }

    #[test]
    fn explicit_number_is_normalized() {
        assert_eq!(next_version(v(1, 2), None, Some("4")).unwrap(), v(4, 0));
        assert_eq!(next_version(v(1, 2), None, Some("0.3")).unwrap(), v(1, 3));
        assert!(next_version(v(1, 2), None, Some("x")).is_err());
    }

    #[test]
    fn nothing_requested() {
        let err = next_version(v(1, 0), None, None).unwrap_err();
        assert_eq!(err.to_string(), "It's not clear what you want to achieve.");
    }
}
