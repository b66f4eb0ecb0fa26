//! Integration tests for patchset commands.
//!
//! These tests verify that commands work correctly with real git
//! repositories, calling the command handlers directly.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use patchset::cli::commands;
use patchset::cli::Context;
use patchset::core::lineage::{list_patchrefs, name_pattern};
use patchset::git::Git;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that creates a real git repository with a commit on main.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        // Prevent git from opening editors during tests
        run_git(dir.path(), &["config", "core.editor", "true"]);

        fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    fn context(&self) -> Context {
        Context {
            cwd: Some(self.path().to_path_buf()),
            quiet: true,
        }
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) {
        fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    fn git_out(&self, args: &[&str]) -> String {
        run_git(self.path(), args)
    }

    fn has_ref(&self, refname: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", refname])
            .current_dir(self.path())
            .output()
            .expect("failed to run git")
            .status
            .success()
    }

    fn tag_message(&self, tag: &str) -> String {
        self.git_out(&["tag", "--list", "--format=%(contents)", tag])
    }
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

const COVER_MESSAGE: &str = "\
From cover Mon Sep 17 00:00:00 2001
From: Test User <test@example.com>
Date: Mon, 1 Jan 2024 00:00:00 +0000
Message-ID: <cover@example.com>
Subject: [PATCH 0/3] Add three files

This series adds three files.

---
notes that stay out of the cover tag
";

/// Write a four message thread (cover plus three patches replying to it)
/// and leave `main` untouched.
fn write_series(repo: &TestRepo, dir: &Path) -> PathBuf {
    repo.git_out(&["switch", "-c", "work"]);
    repo.commit_file("a.txt", "a\n", "add a");
    repo.commit_file("b.txt", "b\n", "add b");
    repo.commit_file("c.txt", "c\n", "add c");

    let patches = repo.git_out(&[
        "format-patch",
        "--stdout",
        "--thread",
        "--in-reply-to=<cover@example.com>",
        "main..work",
    ]);
    repo.git_out(&["switch", "main"]);
    repo.git_out(&["branch", "-D", "work"]);

    let path = dir.join("series.mbox");
    fs::write(&path, format!("{}\n{}\n", COVER_MESSAGE, patches)).unwrap();
    path
}

// =============================================================================
// create / remove
// =============================================================================

mod create {
    use super::*;

    #[test]
    fn creates_branch_and_cover_tag() {
        let repo = TestRepo::new();
        let head = repo.git_out(&["rev-parse", "HEAD"]);

        commands::create(&repo.context(), Some("bar"), None, false, false).unwrap();

        assert_eq!(
            repo.git().current_branch().unwrap().as_deref(),
            Some("refs/heads/patchset/bar/v1.0")
        );
        assert_eq!(
            repo.git_out(&["rev-parse", "patchset/bar/v1.0/cover^{}"]),
            head
        );
        assert!(repo
            .tag_message("patchset/bar/v1.0/cover")
            .starts_with("*** SUBJECT HERE ***"));
    }

    #[test]
    fn explicit_version_is_normalized() {
        let repo = TestRepo::new();
        commands::create(&repo.context(), Some("bar"), Some("3"), false, false).unwrap();
        assert!(repo.has_ref("refs/heads/patchset/bar/v3.0"));
    }

    #[test]
    fn bumps_current_version_and_copies_cover() {
        let repo = TestRepo::new();
        let ctx = repo.context();
        commands::create(&ctx, Some("bar"), None, false, false).unwrap();
        repo.git()
            .create_tag("patchset/bar/v1.0/cover", "HEAD", "Better subject\n\nText\n---\nx\n")
            .unwrap();
        repo.commit_file("a.txt", "a", "add a");

        commands::create(&ctx, None, None, false, true).unwrap();
        assert!(repo.has_ref("refs/heads/patchset/bar/v1.1"));
        assert_eq!(
            repo.tag_message("patchset/bar/v1.1/cover"),
            "Better subject\n\nText"
        );

        commands::create(&ctx, None, None, true, false).unwrap();
        assert!(repo.has_ref("refs/heads/patchset/bar/v2.0"));

        let lineage = list_patchrefs(&repo.git(), &name_pattern("bar")).unwrap();
        assert_eq!(lineage["bar"].patch_vers(), "2.0");
        assert_eq!(lineage["bar"].prev_vers.len(), 2);
    }

    #[test]
    fn no_name_outside_a_patchset() {
        let repo = TestRepo::new();
        let err = commands::create(&repo.context(), None, None, false, true).unwrap_err();
        assert!(err.to_string().contains("patchset"), "{err:#}");
    }

    #[test]
    fn no_name_and_no_bump_is_unclear() {
        let repo = TestRepo::new();
        let ctx = repo.context();
        commands::create(&ctx, Some("bar"), None, false, false).unwrap();

        let err = commands::create(&ctx, None, None, false, false).unwrap_err();
        assert_eq!(err.to_string(), "It's not clear what you want to achieve.");
    }

    #[test]
    fn empty_name() {
        let repo = TestRepo::new();
        let err = commands::create(&repo.context(), Some(""), None, false, false).unwrap_err();
        assert_eq!(err.to_string(), "Empty branch name is not allowed.");
    }
}

mod remove {
    use super::*;

    #[test]
    fn removes_all_versions_and_tags() {
        let repo = TestRepo::new();
        let ctx = repo.context();
        commands::create(&ctx, Some("bar"), None, false, false).unwrap();
        commands::create(&ctx, None, None, false, true).unwrap();
        commands::create(&ctx, Some("keep"), None, false, false).unwrap();

        commands::remove(&ctx, &["bar".to_string()]).unwrap();

        assert!(!repo.has_ref("refs/heads/patchset/bar/v1.0"));
        assert!(!repo.has_ref("refs/heads/patchset/bar/v1.1"));
        assert!(!repo.has_ref("refs/tags/patchset/bar/v1.0/cover"));
        assert!(!repo.has_ref("refs/tags/patchset/bar/v1.1/cover"));
        assert!(repo.has_ref("refs/heads/patchset/keep/v1.0"));
    }

    #[test]
    fn removes_one_version() {
        let repo = TestRepo::new();
        let ctx = repo.context();
        commands::create(&ctx, Some("bar"), None, false, false).unwrap();
        commands::create(&ctx, None, None, false, true).unwrap();

        commands::remove(&ctx, &["patchset/bar/v1.0".to_string()]).unwrap();

        assert!(!repo.has_ref("refs/heads/patchset/bar/v1.0"));
        assert!(repo.has_ref("refs/heads/patchset/bar/v1.1"));
    }

    #[test]
    fn refuses_current_branch() {
        let repo = TestRepo::new();
        let ctx = repo.context();
        commands::create(&ctx, Some("bar"), None, false, false).unwrap();

        assert!(commands::remove(&ctx, &["bar".to_string()]).is_err());
        assert!(repo.has_ref("refs/heads/patchset/bar/v1.0"));
    }

    #[test]
    fn unknown_name() {
        let repo = TestRepo::new();
        assert!(commands::remove(&repo.context(), &["nope".to_string()]).is_err());
    }
}

// =============================================================================
// import / export
// =============================================================================

mod import {
    use super::*;
    use patchset::cli::commands::ImportOptions;

    fn import_opts(name: &str) -> ImportOptions {
        ImportOptions {
            name: Some(name.to_string()),
            start_point: Some("main".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn applies_thread_in_order() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = write_series(&repo, mail_dir.path());
        let main = repo.git_out(&["rev-parse", "main"]);

        commands::import(&repo.context(), &[mbox], import_opts("foo")).unwrap();

        assert_eq!(
            repo.git().current_branch().unwrap().as_deref(),
            Some("refs/heads/patchset/foo/v1.0")
        );
        assert_eq!(
            repo.git_out(&["log", "--format=%s", "main..patchset/foo/v1.0"]),
            "add c\nadd b\nadd a"
        );
        assert_eq!(
            repo.git_out(&["rev-parse", "patchset/foo/v1.0/cover^{}"]),
            main
        );

        let cover = repo.tag_message("patchset/foo/v1.0/cover");
        assert_eq!(cover, "Add three files\n\nThis series adds three files.");
    }

    #[test]
    fn version_from_root_subject() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = write_series(&repo, mail_dir.path());
        let text = fs::read_to_string(&mbox)
            .unwrap()
            .replace("[PATCH 0/3]", "[PATCH v4 0/3]");
        fs::write(&mbox, text).unwrap();

        commands::import(&repo.context(), &[mbox], import_opts("foo")).unwrap();
        assert!(repo.has_ref("refs/heads/patchset/foo/v4.0"));
    }

    #[test]
    fn print_tree_changes_nothing() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = write_series(&repo, mail_dir.path());

        let opts = ImportOptions {
            print_tree: true,
            ..Default::default()
        };
        commands::import(&repo.context(), &[mbox], opts).unwrap();

        assert!(!repo.has_ref("refs/heads/patchset/foo/v1.0"));
    }

    #[test]
    fn two_conversations_are_rejected() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = write_series(&repo, mail_dir.path());
        let other = mail_dir.path().join("other.mbox");
        fs::write(
            &other,
            "From x Mon Sep 17 00:00:00 2001\nMessage-ID: <other@example.com>\nSubject: unrelated\n\nhello\n",
        )
        .unwrap();

        let err =
            commands::import(&repo.context(), &[mbox, other], import_opts("foo")).unwrap_err();
        assert_eq!(err.to_string(), "too many conversations in the file list: 2");
    }

    #[test]
    fn thread_without_patches() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = mail_dir.path().join("talk.mbox");
        fs::write(&mbox, COVER_MESSAGE).unwrap();

        let err = commands::import(&repo.context(), &[mbox], import_opts("foo")).unwrap_err();
        assert_eq!(err.to_string(), "no patches found to apply");
    }
}

mod export {
    use super::*;
    use patchset::cli::commands::{ExportOptions, ImportOptions};

    #[test]
    fn writes_cover_letter_and_patches() {
        let repo = TestRepo::new();
        let mail_dir = TempDir::new().unwrap();
        let mbox = write_series(&repo, mail_dir.path());
        let ctx = repo.context();
        commands::import(
            &ctx,
            &[mbox],
            ImportOptions {
                name: Some("foo".to_string()),
                start_point: Some("main".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        repo.git_out(&["config", "--add", "patchset.to", "list@example.org"]);

        let out_dir = TempDir::new().unwrap();
        commands::export(
            &ctx,
            Some("foo"),
            ExportOptions {
                rfc: true,
                output_directory: Some(out_dir.path().to_path_buf()),
                ..Default::default()
            },
        )
        .unwrap();

        let mut files: Vec<String> = fs::read_dir(out_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files.len(), 4, "{files:?}");

        let cover = files
            .iter()
            .find(|f| f.contains("cover-letter"))
            .expect("no cover letter");
        let cover = fs::read_to_string(out_dir.path().join(cover)).unwrap();
        assert!(cover.contains("Add three files"), "{cover}");
        assert!(cover.contains("Subject: [RFC"), "{cover}");
        assert!(cover.contains("0/3]"), "{cover}");
        assert!(cover.contains("To: list@example.org"), "{cover}");
    }
}
