//! export command - Write a patchset out as mail files
//!
//! Runs `git format-patch` over `<base>..<tip>` of one patchset version with
//! the cover letter taken from the cover tag, the reroll count taken from
//! the major version, and recipients and subject tags from git config.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::commands::resolve_patchref;
use crate::cli::Context;
use crate::core::cover::{cover_letter, DEFAULT_COVER_MESSAGE};
use crate::core::refs::UNKNOWN_BASE;

/// Flags of `patchset export`.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub rfc: bool,
    pub resend: bool,
    pub in_reply_to: Option<String>,
    pub output_directory: Option<PathBuf>,
}

/// Export a patchset.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Patchset (default: the current one)
/// * `opts` - Export flags
pub fn export(ctx: &Context, name: Option<&str>, opts: ExportOptions) -> Result<()> {
    let git = ctx.open_repo()?;
    let config = ctx.load_config(&git)?;
    let mut patchref = resolve_patchref(&git, name)?;

    let version = patchref
        .version()
        .ok_or_else(|| anyhow!("{} has no version", patchref.short_name()))?;
    let branch = patchref.branch_name();

    let base = patchref.patch_base(&git, None).to_string();
    if base == UNKNOWN_BASE {
        bail!(
            "Unable to find the base of {}; fix it with 'patchset cover --use-commit'",
            patchref.short_name()
        );
    }
    let object = patchref.object(&git).to_string();

    let outdir = opts
        .output_directory
        .clone()
        .unwrap_or_else(|| config.export_dir(patchref.patch_name()));
    // git runs in the work tree, so relative paths are anchored here
    let outdir = if outdir.is_relative() {
        ctx.cwd()?.join(outdir)
    } else {
        outdir
    };
    fs::create_dir_all(&outdir)
        .with_context(|| format!("Failed to create {}", outdir.display()))?;

    let letter = git
        .tag_message(&patchref.covertag())
        .context("Failed to read cover tag")?
        .map(|message| cover_letter(&message))
        .filter(|letter| !letter.is_empty())
        .unwrap_or_else(|| DEFAULT_COVER_MESSAGE.to_string());
    let description = tempfile::Builder::new()
        .prefix("patchset-description-")
        .tempfile()
        .context("Failed to create temporary file")?;
    fs::write(description.path(), &letter).context("Failed to write cover letter")?;

    let tags = subject_tags(&opts, &git.config_get_all(&format!("branch.{branch}.tags"))?);
    let mut recipients = Vec::new();
    for field in ["to", "cc"] {
        recipients.push(git.config_get_all(&format!("patchset.{field}"))?);
        recipients.push(git.config_get_all(&format!("branch.{branch}.{field}"))?);
    }

    let mut args: Vec<String> = vec![
        "--thread".into(),
        "--minimal".into(),
        "--reroll-count".into(),
        version.major().to_string(),
    ];
    if config.export_cover_letter() {
        args.push("--cover-letter".into());
        args.push("--cover-from-description=subject".into());
    }
    if let Some(id) = &opts.in_reply_to {
        args.push("--in-reply-to".into());
        args.push(id.clone());
    }
    args.push("--output-directory".into());
    args.push(outdir.to_string_lossy().into_owned());
    if !tags.is_empty() {
        args.push("--subject-prefix".into());
        args.push(tags.join(" "));
    }
    args.extend(recipient_args(&recipients));
    args.push("--description-file".into());
    args.push(description.path().to_string_lossy().into_owned());
    args.push(format!("{}..{}", base, object));

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = git.format_patch(&args)?;
    for line in out.lines().filter(|l| !l.trim().is_empty()) {
        log::warn!("{}", line);
    }

    Ok(())
}

/// Subject prefix words: `RFC`, `RESEND`, then the configured tags.
fn subject_tags(opts: &ExportOptions, configured: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    if opts.rfc {
        tags.push("RFC".to_string());
    }
    if opts.resend {
        tags.push("RESEND".to_string());
    }
    tags.extend(
        configured
            .iter()
            .flat_map(|line| line.split_whitespace())
            .map(String::from),
    );
    tags
}

/// `--to`/`--cc` arguments from `[patchset.to, branch.to, patchset.cc,
/// branch.cc]` value lists.
///
/// An address is used once, with the first field it appears under; each
/// field's addresses are sorted.
fn recipient_args(lists: &[Vec<String>]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut args = Vec::new();

    for (field, pair) in ["--to", "--cc"].iter().zip(lists.chunks(2)) {
        let mut names: Vec<&String> = pair
            .iter()
            .flatten()
            .filter(|name| seen.insert(name.to_string()))
            .collect();
        names.sort_unstable();
        for name in names {
            args.push(field.to_string());
            args.push(name.clone());
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tags_order() {
        let opts = ExportOptions {
            rfc: true,
            resend: true,
            ..Default::default()
        };
        assert_eq!(
            subject_tags(&opts, &strings(&["net-next  PATCH"])),
            strings(&["RFC", "RESEND", "net-next", "PATCH"])
        );
        assert!(subject_tags(&ExportOptions::default(), &[]).is_empty());
    }

    #[test]
    fn recipients_sorted_per_field() {
        let lists = vec![
            strings(&["z@x", "a@x"]),
            strings(&["m@x"]),
            strings(&["c@x", "a@x"]),
            strings(&["b@x"]),
        ];
        assert_eq!(
            recipient_args(&lists),
            strings(&[
                "--to", "a@x", "--to", "m@x", "--to", "z@x", "--cc", "b@x", "--cc", "c@x",
            ])
        );
    }
}
