//! mail::subject
//!
//! Patch subject conventions: `[PATCH v3 2/5] summary`.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::version::Version;

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"^(\[[^\]]*\]\s*)?(.*)$").expect("invalid subject regex"))
}

fn version_regex() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"\bv(\d+)\b").expect("invalid version regex"))
}

fn split_tag(subject: &str) -> (Option<&str>, &str) {
    match tag_regex().captures(subject) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str()),
            caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
        ),
        None => (None, subject),
    }
}

/// Subject without its leading bracketed tag.
///
/// ```
/// use patchset::mail::subject::strip_subject_tag;
///
/// assert_eq!(strip_subject_tag("[PATCH v2 1/3] fix thing"), "fix thing");
/// assert_eq!(strip_subject_tag("fix thing"), "fix thing");
/// ```
pub fn strip_subject_tag(subject: &str) -> &str {
    split_tag(subject).1
}

/// Series version announced in the subject tag.
///
/// A `v<N>` token inside the leading tag gives the major version; without
/// one the series is version `1.0`.
///
/// ```
/// use patchset::mail::subject::subject_version;
///
/// assert_eq!(subject_version("[PATCH v3 2/5] fix thing").to_string(), "3.0");
/// assert_eq!(subject_version("fix thing").to_string(), "1.0");
/// ```
pub fn subject_version(subject: &str) -> Version {
    let major = split_tag(subject)
        .0
        .and_then(|tag| version_regex().captures(tag))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("1");

    Version::normalize(major).unwrap_or(Version::INITIAL)
}
