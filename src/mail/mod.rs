//! mail
//!
//! Mailbox reading and thread reconstruction for `patchset import`.
//!
//! # Modules
//!
//! - [`mbox`] - Splitting mbox files into raw messages
//! - [`message`] - Parsing the headers and body threading needs
//! - [`thread`] - Reply tree arena, normalization and traversal
//! - [`subject`] - `[PATCH vN m/n]` subject conventions

pub mod mbox;
pub mod message;
pub mod subject;
pub mod thread;

use std::path::Path;

pub use message::{MailError, MailMessage};
pub use thread::{Node, NodeList};

/// Build a normalized thread forest from mailbox files.
///
/// Files are read in the given order and messages in mailbox order.
pub fn threads_from_files<P: AsRef<Path>>(paths: &[P]) -> Result<NodeList, MailError> {
    let mut nodes = NodeList::new();

    for path in paths {
        for message in mbox::read_mbox(path.as_ref())? {
            nodes.add_message(message);
        }
    }
    nodes.normalize();

    Ok(nodes)
}
