//! mail::message
//!
//! One message out of a mailbox, with the headers threading needs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use mailparse::{parse_mail, MailHeaderMap, ParsedMail};
use regex::Regex;
use thiserror::Error;

/// Errors from reading or writing mailbox content.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to read mailbox '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse message {index} in '{path}': {source}")]
    Parse {
        path: PathBuf,
        index: usize,
        source: mailparse::MailParseError,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

static MSGID_RE: OnceLock<Regex> = OnceLock::new();

fn msgid_regex() -> &'static Regex {
    MSGID_RE.get_or_init(|| Regex::new(r"<[^\s<>]+@[^\s<>]+>").expect("invalid message-id regex"))
}

/// Every `<local@domain>` token in a header value, in order.
pub fn extract_message_ids(value: &str) -> Vec<String> {
    msgid_regex()
        .find_iter(value)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Canonical form of a Message-ID header: the first `<...>` token, or the
/// trimmed value wrapped in angle brackets.
fn normalize_message_id(value: &str) -> Option<String> {
    if let Some(id) = extract_message_ids(value).into_iter().next() {
        return Some(id);
    }
    let trimmed = value.trim().trim_matches(&['<', '>'][..]).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("<{}>", trimmed))
    }
}

fn text_body(parsed: &ParsedMail<'_>) -> String {
    if parsed.subparts.is_empty() {
        return parsed.get_body().unwrap_or_default();
    }

    parsed
        .subparts
        .iter()
        .find(|part| part.ctype.mimetype == "text/plain")
        .and_then(|part| part.get_body().ok())
        .unwrap_or_else(|| parsed.get_body().unwrap_or_default())
}

/// A single mailbox entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    source: PathBuf,
    index: usize,
    raw: Vec<u8>,
    /// Normalized `Message-ID`, absent if the header is missing or empty.
    pub message_id: Option<String>,
    /// Ids listed in `References`, oldest first.
    pub references: Vec<String>,
    /// Ids listed in `In-Reply-To`.
    pub in_reply_to: Vec<String>,
    /// Decoded subject with line breaks removed.
    pub subject: Option<String>,
    /// Text body.
    pub body: String,
}

impl MailMessage {
    /// Parse one raw entry. `raw` may start with the mbox `From ` line.
    pub fn parse(source: &Path, index: usize, raw: Vec<u8>) -> Result<Self, MailError> {
        let (message_id, references, in_reply_to, subject, body) = {
            let parsed = parse_mail(strip_from_line(&raw)).map_err(|err| MailError::Parse {
                path: source.to_path_buf(),
                index,
                source: err,
            })?;

            let headers = &parsed.headers;
            (
                headers
                    .get_first_value("Message-ID")
                    .and_then(|v| normalize_message_id(&v)),
                headers
                    .get_first_value("References")
                    .map(|v| extract_message_ids(&v))
                    .unwrap_or_default(),
                headers
                    .get_first_value("In-Reply-To")
                    .map(|v| extract_message_ids(&v))
                    .unwrap_or_default(),
                headers
                    .get_first_value("Subject")
                    .map(|s| s.replace(['\r', '\n'], "")),
                text_body(&parsed),
            )
        };

        Ok(Self {
            source: source.to_path_buf(),
            index,
            message_id,
            references,
            in_reply_to,
            subject,
            body,
            raw,
        })
    }

    /// Path of the mailbox this message came from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Zero-based position within its mailbox.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Ids from `References` then `In-Reply-To` without duplicates, followed
    /// by the message's own id.
    pub fn reference_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();

        for id in self.references.iter().chain(&self.in_reply_to) {
            if !chain.contains(id) {
                chain.push(id.clone());
            }
        }
        if let Some(id) = &self.message_id {
            chain.push(id.clone());
        }

        chain
    }

    /// Write the raw message bytes to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), MailError> {
        fs::write(path, &self.raw).map_err(|source| MailError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn strip_from_line(raw: &[u8]) -> &[u8] {
    if !raw.starts_with(b"From ") {
        return raw;
    }
    match raw.iter().position(|&b| b == b'\n') {
        Some(end) => &raw[end + 1..],
        None => &[],
    }
}
