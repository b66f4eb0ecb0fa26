//! mail::mbox
//!
//! Splitting mbox files into messages.
//!
//! A line is a message separator when it starts with `From ` and is either
//! the first line of the file or follows an empty line. Each message keeps
//! its separator line so it can be handed to `git am` unchanged. A file that
//! does not start with a separator is read as a single message.

use std::fs;
use std::path::Path;

use super::message::{MailError, MailMessage};

fn is_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| matches!(b, b'\r' | b'\n'))
}

/// Split raw mbox bytes into raw messages.
pub fn split_mbox(data: &[u8]) -> Vec<Vec<u8>> {
    let mut messages = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut previous_blank = true;

    for line in data.split_inclusive(|&b| b == b'\n') {
        if previous_blank && is_separator(line) && !current.is_empty() {
            messages.push(std::mem::take(&mut current));
        }
        previous_blank = is_blank(line);
        current.extend_from_slice(line);
    }

    if !current.iter().all(|b| b.is_ascii_whitespace()) {
        messages.push(current);
    }

    messages
}

/// Read and parse every message in an mbox file, in file order.
pub fn read_mbox(path: &Path) -> Result<Vec<MailMessage>, MailError> {
    let data = fs::read(path).map_err(|source| MailError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let messages = split_mbox(&data)
        .into_iter()
        .enumerate()
        .map(|(index, raw)| MailMessage::parse(path, index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("read {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MBOX: &str = "\
From a Mon Sep 17 00:00:00 2001
Message-ID: <1@x>
Subject: one

body starts here
From this line is a body line too.

From b Mon Sep 17 00:00:00 2001
Message-ID: <2@x>
Subject: two

second
";

    #[test]
    fn splits_on_separator_after_blank_line() {
        let messages = split_mbox(MBOX.as_bytes());
        assert_eq!(messages.len(), 2);

        let first = String::from_utf8(messages[0].clone()).unwrap();
        assert!(first.starts_with("From a "));
        assert!(first.contains("From this line is a body line too."));

        let second = String::from_utf8(messages[1].clone()).unwrap();
        assert!(second.starts_with("From b "));
        assert!(second.ends_with("second\n"));
    }

    #[test]
    fn single_message_without_separator() {
        let messages = split_mbox(b"Message-ID: <1@x>\n\nbody\n");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(split_mbox(b"").is_empty());
        assert!(split_mbox(b"\n\n").is_empty());
    }

    #[test]
    fn reads_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("series.mbox");
        fs::write(&path, MBOX).unwrap();

        let messages = read_mbox(&path).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].message_id.as_deref(), Some("<2@x>"));
        assert_eq!(messages[1].index(), 1);
        assert_eq!(messages[1].source(), path.as_path());
    }

    #[test]
    fn missing_file() {
        let err = read_mbox(Path::new("/nonexistent/series.mbox")).unwrap_err();
        assert!(matches!(err, MailError::Read { .. }));
    }
}
