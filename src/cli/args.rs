//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--verbose` / `-v`: More log output (repeatable)
//! - `--quiet` / `-q`: Only errors

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// patchset - versioned patch series with cover letters
#[derive(Parser, Debug)]
#[command(name = "patchset")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if patchset was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Print more details (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Default log filter for the given flags.
    ///
    /// `RUST_LOG` still overrides this.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show patchsets in the repository
    #[command(
        name = "list",
        alias = "ls",
        after_help = "\
OUTPUT:
    > patchset/<name>/<vers> marks the checked-out patchset.
    Each line shows <base>..<tip>, the number of commits and the name."
    )]
    List {
        /// Also show older versions of each patchset
        #[arg(long)]
        versions: bool,

        /// Show archived patchsets instead of active ones
        #[arg(long)]
        archived: bool,
    },

    /// Create a new patchset or a new version of the current one
    #[command(
        name = "create",
        after_help = "\
EXAMPLES:
    # Start patchset/foo/v1.0 from HEAD
    patchset create foo

    # From patchset/foo/v1.2, start patchset/foo/v2.0
    patchset create --next

    # From patchset/foo/v1.2, start patchset/foo/v1.3
    patchset create --increment"
    )]
    Create {
        /// Name of the new patchset (default: the current one)
        name: Option<String>,

        /// Explicit version as MAJOR[.MINOR]
        #[arg(short = 'N', long = "number", value_name = "VERSION")]
        number: Option<String>,

        /// Bump the major version of the current patchset
        #[arg(short, long, conflicts_with_all = ["name", "number", "increment"])]
        next: bool,

        /// Bump the minor version of the current patchset
        #[arg(short, long, conflicts_with_all = ["name", "number"])]
        increment: bool,
    },

    /// Delete patchsets with all their versions and cover tags
    #[command(name = "remove", alias = "rm")]
    Remove {
        /// Patchsets to remove
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Edit recipients and subject tags of a patchset
    #[command(name = "config")]
    Config {
        /// Patchset to configure (default: the current one)
        name: Option<String>,
    },

    /// Edit the cover letter of a patchset
    #[command(name = "cover")]
    Cover {
        /// Patchset whose cover letter to edit (default: the current one)
        name: Option<String>,

        /// Re-point the cover tag at the detected base commit
        #[arg(long, conflicts_with = "use_commit")]
        fix: bool,

        /// Re-point the cover tag at REV
        #[arg(long, value_name = "REV")]
        use_commit: Option<String>,
    },

    /// Write a patchset out as mail files with git format-patch
    #[command(name = "export")]
    Export {
        /// Patchset to export (default: the current one)
        name: Option<String>,

        /// Mark the series as a request for comments
        #[arg(long)]
        rfc: bool,

        /// Mark the series as resent
        #[arg(long)]
        resend: bool,

        /// Make the first mail a reply to MESSAGE-ID
        #[arg(long, value_name = "MESSAGE-ID")]
        in_reply_to: Option<String>,

        /// Write files to DIR (default: <output_dir>/<name>)
        #[arg(short, long = "output-directory", value_name = "DIR")]
        output_directory: Option<PathBuf>,
    },

    /// Send exported mail files with git send-email
    #[command(name = "send")]
    Send {
        /// Files to send
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Turn a mailing list thread into a new patchset
    #[command(
        name = "import",
        after_help = "\
EXAMPLES:
    # Inspect the threads in a mailbox
    patchset import --print-tree series.mbox

    # Create patchset/foo/v<N>.0 and apply the series
    patchset import --name foo series.mbox"
    )]
    Import {
        /// Name of the patchset to create
        #[arg(long, required_unless_present = "print_tree")]
        name: Option<String>,

        /// Commit to start the new branch from
        #[arg(long, value_name = "REV")]
        start_point: Option<String>,

        /// Add Signed-off-by trailers while applying
        #[arg(long)]
        signoff: bool,

        /// Only print the thread tree found in the mailboxes
        #[arg(long)]
        print_tree: bool,

        /// Mailbox files to read
        #[arg(required = true, value_name = "MBOX")]
        mboxes: Vec<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
