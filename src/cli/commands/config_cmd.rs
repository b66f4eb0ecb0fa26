//! config command - Edit recipients and subject tags
//!
//! Recipients and tags live in git config so that `git format-patch` and
//! `git send-email` see the same values:
//!
//! - `patchset.to`, `patchset.cc`: recipients of every patchset
//! - `branch.<branch>.to`, `branch.<branch>.cc`: recipients of one version
//! - `branch.<branch>.tags`: extra subject prefix words
//!
//! The values are written to a git-config formatted scratch file and opened
//! in the editor. Nothing is written back unless the file changed.

use std::collections::{BTreeSet, HashSet};
use std::fs;

use anyhow::{Context as _, Result};

use crate::cli::commands::{current_patchref, resolve_patchref};
use crate::cli::Context;
use crate::git::Git;
use crate::ui::editor::{edit_file, find_editor};

const HELP: &str = "\
#
# Available fields:
#
# - patchset.to, branch.*.to, patchset.cc, branch.*.cc
#
# Fields define the recipients for this patchset. One recipient per line. The
# field can be specified multiple times. Fields in the patchset section apply
# to every patchset.
#
# - branch.*.tags
#
# Words added to the subject prefix of each patch.
#
";

/// Where a recipient was configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    To,
    Cc,
    BranchTo,
    BranchCc,
}

/// Recipients in first-seen order; an address keeps the field it was first
/// seen in.
#[derive(Debug, Default)]
struct Recipients {
    entries: Vec<(String, Field)>,
    seen: HashSet<String>,
}

impl Recipients {
    fn add(&mut self, field: Field, names: impl IntoIterator<Item = String>) {
        for name in names {
            if self.seen.insert(name.clone()) {
                self.entries.push((name, field));
            }
        }
    }

    /// Sorted addresses recorded under `field`.
    fn of(&self, field: Field) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, f)| *f == field)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Settings of one patchset branch.
#[derive(Debug, Default)]
struct BranchSettings {
    name: String,
    tags: Vec<String>,
    remote: Option<String>,
    merge: Option<String>,
}

/// Edit recipients and tags.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Patchset (default: the current one, if any)
pub fn config(ctx: &Context, name: Option<&str>) -> Result<()> {
    let git = ctx.open_repo()?;

    let branch = match name {
        Some(_) => Some(resolve_patchref(&git, name)?.branch_name()),
        None => current_patchref(&git).ok().map(|r| r.branch_name()),
    };

    let mut recipients = Recipients::default();
    recipients.add(Field::To, git.config_get_all("patchset.to")?);
    recipients.add(Field::Cc, git.config_get_all("patchset.cc")?);

    let settings = match &branch {
        Some(branch) => {
            recipients.add(
                Field::BranchTo,
                git.config_get_all(&format!("branch.{branch}.to"))?,
            );
            recipients.add(
                Field::BranchCc,
                git.config_get_all(&format!("branch.{branch}.cc"))?,
            );
            Some(read_branch_settings(&git, branch)?)
        }
        None => None,
    };

    let editor = find_editor(&git)?;
    let file = tempfile::Builder::new()
        .prefix("patchset-config-")
        .suffix(".ini")
        .tempfile()
        .context("Failed to create temporary file")?;
    fs::write(file.path(), render(&recipients, settings.as_ref()))
        .context("Failed to write config file")?;

    if !edit_file(&editor, file.path())? {
        log::info!("Configuration has not changed.");
        return Ok(());
    }

    let edited = Git::read_config_file(file.path()).context("Failed to parse edited config")?;
    for name in variable_names(branch.as_deref(), &edited) {
        let values: Vec<String> = edited
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| {
                if name.ends_with(".tags") {
                    collapse_whitespace(v)
                } else {
                    v.clone()
                }
            })
            .collect();

        git.config_replace_all(&name, &values)
            .with_context(|| format!("Failed to update {}", name))?;
        log::debug!("{} = {:?}", name, values);
    }

    log::info!("Configuration has been updated.");
    Ok(())
}

fn read_branch_settings(git: &Git, branch: &str) -> Result<BranchSettings> {
    let first = |key: &str| -> Result<Option<String>> {
        Ok(git
            .config_get_all(&format!("branch.{branch}.{key}"))?
            .into_iter()
            .next())
    };

    let tags = git
        .config_get_all(&format!("branch.{branch}.tags"))?
        .iter()
        .flat_map(|line| line.split_whitespace().map(String::from).collect::<Vec<_>>())
        .collect();

    Ok(BranchSettings {
        name: branch.to_string(),
        tags,
        remote: first("remote")?,
        merge: first("merge")?,
    })
}

fn render(recipients: &Recipients, branch: Option<&BranchSettings>) -> String {
    let mut out = String::from("[patchset]\n");
    for name in recipients.of(Field::To) {
        out.push_str(&format!("\tto = {}\n", name));
    }
    for name in recipients.of(Field::Cc) {
        out.push_str(&format!("\tcc = {}\n", name));
    }

    if let Some(branch) = branch {
        out.push_str(&format!("\n[branch \"{}\"]\n", branch.name));
        for name in recipients.of(Field::BranchTo) {
            out.push_str(&format!("\tto = {}\n", name));
        }
        for name in recipients.of(Field::BranchCc) {
            out.push_str(&format!("\tcc = {}\n", name));
        }
        if !branch.tags.is_empty() {
            out.push_str(&format!("\ttags = {}\n", branch.tags.join(" ")));
        }
        if let Some(remote) = &branch.remote {
            out.push_str(&format!("\tremote = {}\n", remote));
        }
        if let Some(merge) = &branch.merge {
            out.push_str(&format!("\tmerge = {}\n", merge));
        }
    }

    out.push('\n');
    out.push_str(HELP);
    out
}

/// Every variable to rewrite: the known ones plus whatever the file names.
///
/// Known variables missing from the file end up unset.
fn variable_names(branch: Option<&str>, edited: &[(String, String)]) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = ["patchset.to", "patchset.cc"]
        .into_iter()
        .map(String::from)
        .collect();

    if let Some(branch) = branch {
        for key in ["to", "cc", "remote", "merge", "tags"] {
            names.insert(format!("branch.{branch}.{key}"));
        }
    }
    names.extend(edited.iter().map(|(name, _)| name.clone()));

    names
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
